//! Built-in read-only tools for the CLI.
//!
//! Provides `read_file`, `list_directory` and `search_files`, which let the
//! model inspect the local project without changing it. Each tool is
//! constructed via [`AgentTool::new`] and returned as `Arc<dyn Tool>`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use toolchat::tools::builtin::all_tools;
//!
//! let tools = all_tools();
//! assert_eq!(tools.len(), 3);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::ToolchatError;
use crate::tools::tool::{AgentTool, Tool, ToolExecutionContext};
use crate::tools::types::{ToolParameters, ToolResult};

const READ_FILE_MAX_BYTES: usize = 65_536;
const SEARCH_OUTPUT_MAX_BYTES: usize = 32_768;
const SEARCH_DEFAULT_MAX_MATCHES: usize = 200;

fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }

    let mut cutoff = max_bytes;
    while cutoff > 0 && !s.is_char_boundary(cutoff) {
        cutoff -= 1;
    }
    s[..cutoff].to_string()
}

/// Create the `read_file` tool: reads a file as UTF-8 text.
///
/// The text itself is the output, so the model sees it verbatim. Content is
/// capped at 64 KB with a trailing note when truncated.
pub fn read_file_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "read_file",
        "Read a file's contents as UTF-8 text",
        ToolParameters::object()
            .string("path", "Path to the file to read", true)
            .build(),
        |args_val, _ctx: ToolExecutionContext| async move {
            let path = args_val.get_str("path")?;

            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ToolchatError::tool("read_file", format!("{path}: {e}")))?;

            let total_bytes = content.len();
            let truncated = total_bytes > READ_FILE_MAX_BYTES;
            let display = if truncated {
                let mut s = truncate_utf8(&content, READ_FILE_MAX_BYTES);
                s.push_str("\n... (truncated)");
                s
            } else {
                content
            };

            debug!(path, bytes = total_bytes, truncated, "read file");
            Ok(ToolResult::ok(display))
        },
    ))
}

/// Create the `list_directory` tool: lists directory entries.
///
/// Returns a sorted array of entries, each with `name`, `type`
/// (`"file"` | `"dir"` | `"other"`), and `size` in bytes.
pub fn list_directory_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "list_directory",
        "List files and directories in a given path",
        ToolParameters::object()
            .string("path", "Path to the directory to list (defaults to '.')", false)
            .build(),
        |args_val, _ctx: ToolExecutionContext| async move {
            let path = args_val.get_str_opt("path").unwrap_or(".").to_string();
            let list_err = |e: std::io::Error| ToolchatError::tool("list_directory", format!("{path}: {e}"));

            let mut read_dir = tokio::fs::read_dir(&path).await.map_err(list_err)?;

            let mut entries = Vec::new();
            while let Some(entry) = read_dir.next_entry().await.map_err(list_err)? {
                let metadata = entry.metadata().await.map_err(list_err)?;

                let entry_type = if metadata.is_dir() {
                    "dir"
                } else if metadata.is_file() {
                    "file"
                } else {
                    "other"
                };

                entries.push(serde_json::json!({
                    "name": entry.file_name().to_string_lossy(),
                    "type": entry_type,
                    "size": metadata.len(),
                }));
            }

            entries.sort_by(|a, b| {
                let a_name = a["name"].as_str().unwrap_or("");
                let b_name = b["name"].as_str().unwrap_or("");
                a_name.cmp(b_name)
            });

            let count = entries.len();
            Ok(ToolResult::ok_with_data(
                format!("{count} entries in {path}"),
                serde_json::json!({
                    "path": path,
                    "entries": entries,
                    "count": count,
                }),
            ))
        },
    ))
}

#[derive(Debug)]
struct SearchHit {
    path: PathBuf,
    line: usize,
    text: String,
}

/// Walk `root` in name order and collect lines matching `pattern`.
///
/// Hidden and git-ignored entries are skipped and symlinks are not followed.
/// Files that are not UTF-8 are ignored.
fn search_tree(root: &Path, pattern: &Regex, max_matches: usize) -> std::io::Result<(Vec<SearchHit>, bool)> {
    if !root.exists() {
        return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"));
    }

    let mut builder = WalkBuilder::new(root);
    builder.follow_links(false);
    builder.hidden(true);
    builder.git_ignore(true);
    builder.require_git(false);
    builder.sort_by_file_name(|a, b| a.cmp(b));

    let mut hits = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                debug!(error = %error, "skipping unreadable search entry");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let Ok(content) = std::fs::read_to_string(entry.path()) else {
            continue;
        };
        for (idx, line) in content.lines().enumerate() {
            if pattern.is_match(line) {
                if hits.len() == max_matches {
                    return Ok((hits, true));
                }
                hits.push(SearchHit {
                    path: entry.path().to_path_buf(),
                    line: idx + 1,
                    text: line.to_string(),
                });
            }
        }
    }

    Ok((hits, false))
}

/// Create the `search_files` tool: regex search over files under a directory.
///
/// Each match is reported as `path:line:text`. Matches are capped at
/// `max_results` (default 200) and the text output at 32 KB. `ignore_case`
/// makes the pattern case-insensitive.
pub fn search_files_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "search_files",
        "Search file contents under a directory for a regular expression",
        ToolParameters::object()
            .string("pattern", "Regular expression to search for", true)
            .string(
                "path",
                "Directory or file to search in (defaults to '.')",
                false,
            )
            .integer("max_results", "Maximum number of matches to return", false)
            .boolean("ignore_case", "Match case-insensitively (defaults to false)", false)
            .build(),
        |args_val, _ctx: ToolExecutionContext| async move {
            let pattern = args_val.get_str("pattern")?;
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(args_val.get_bool_or("ignore_case", false))
                .build()
                .map_err(|e| ToolchatError::InvalidArgument(format!("invalid pattern: {e}")))?;
            let root = PathBuf::from(args_val.get_str_opt("path").unwrap_or("."));
            let max_matches = args_val
                .get_u64_opt("max_results")
                .map(|n| n as usize)
                .unwrap_or(SEARCH_DEFAULT_MAX_MATCHES);

            let walk_root = root.clone();
            let (hits, capped) =
                tokio::task::spawn_blocking(move || search_tree(&walk_root, &regex, max_matches))
                    .await
                    .map_err(|e| ToolchatError::tool("search_files", e.to_string()))?
                    .map_err(|e| ToolchatError::tool("search_files", format!("{}: {e}", root.display())))?;

            let mut output = hits
                .iter()
                .map(|h| format!("{}:{}:{}", h.path.display(), h.line, h.text))
                .collect::<Vec<_>>()
                .join("\n");
            let truncated = capped || output.len() > SEARCH_OUTPUT_MAX_BYTES;
            if output.len() > SEARCH_OUTPUT_MAX_BYTES {
                output = truncate_utf8(&output, SEARCH_OUTPUT_MAX_BYTES);
            }
            if truncated {
                output.push_str("\n... (truncated)");
            }

            let matches: Vec<serde_json::Value> = hits
                .iter()
                .map(|h| {
                    serde_json::json!({
                        "path": h.path.display().to_string(),
                        "line": h.line,
                        "text": h.text,
                    })
                })
                .collect();

            Ok(ToolResult::ok_with_data(
                output.clone(),
                serde_json::json!({
                    "output": output,
                    "count": matches.len(),
                    "matches": matches,
                    "truncated": truncated,
                }),
            ))
        },
    ))
}

/// Return all built-in tools.
pub fn all_tools() -> Vec<Arc<dyn Tool>> {
    vec![read_file_tool(), list_directory_tool(), search_files_tool()]
}

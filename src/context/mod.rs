//! Context gathering: project files rendered as a prompt prefix.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ToolchatError;

#[async_trait]
pub trait ContextGatherer: Send + Sync {
    /// Gather context text. An empty string means nothing was found.
    async fn gather(&self) -> Result<String, ToolchatError>;
}

/// Reads a fixed list of files, each capped at `max_bytes`.
#[derive(Debug, Clone)]
pub struct FileContext {
    files: Vec<PathBuf>,
    max_bytes: usize,
}

impl FileContext {
    pub fn new(files: Vec<PathBuf>, max_bytes: usize) -> Self {
        Self { files, max_bytes }
    }
}

#[async_trait]
impl ContextGatherer for FileContext {
    async fn gather(&self) -> Result<String, ToolchatError> {
        let mut out = String::new();
        for path in &self.files {
            let content = match tokio::fs::read_to_string(path).await {
                Ok(content) => content,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "skipping context file");
                    continue;
                }
            };

            let mut cutoff = content.len().min(self.max_bytes);
            while !content.is_char_boundary(cutoff) {
                cutoff -= 1;
            }
            let body = content[..cutoff].trim_end();

            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("## File: {}\n\n```\n{body}\n```\n", path.display()));
        }
        Ok(out)
    }
}

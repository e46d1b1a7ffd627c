//! Project memory: a markdown file whose sections are sent as a cache hint.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ToolchatError;

const DEFAULT_TEMPLATE: &str = "# Project Memory

This file is read by toolchat and sent along with every request.

## Project Context

Describe the project, its layout, and its conventions here.

## Common Commands

List the commands you run most often here.
";

/// Source of the provider cache hint.
#[async_trait]
pub trait ProjectMemory: Send + Sync {
    /// Load (or reload) memory from its backing store.
    async fn load(&self, cancel: &CancellationToken) -> Result<(), ToolchatError>;

    /// Rendered context; empty when nothing is loaded.
    fn context(&self) -> String;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MemoryConfig {
    pub enabled: bool,
    /// Path relative to the project directory.
    pub file: String,
    pub create_if_missing: bool,
    /// Section keys (snake_case titles) included in the rendered context.
    pub sections: Vec<String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file: "MEMORY.md".into(),
            create_if_missing: true,
            sections: vec!["project_context".into(), "common_commands".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Section {
    key: String,
    title: String,
    content: String,
}

/// [`ProjectMemory`] backed by a markdown file under a base directory.
#[derive(Debug)]
pub struct FileMemory {
    base_dir: PathBuf,
    config: MemoryConfig,
    sections: RwLock<Option<Vec<Section>>>,
}

impl FileMemory {
    pub fn new(base_dir: impl Into<PathBuf>, config: MemoryConfig) -> Self {
        Self {
            base_dir: base_dir.into(),
            config,
            sections: RwLock::new(None),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.base_dir.join(&self.config.file)
    }

    async fn read_or_create(&self, path: &Path) -> Result<String, ToolchatError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !self.config.create_if_missing {
                    return Err(ToolchatError::MemoryNotFound(path.to_path_buf()));
                }
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(path, DEFAULT_TEMPLATE).await?;
                debug!(path = %path.display(), "created default project memory");
                Ok(DEFAULT_TEMPLATE.to_string())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ProjectMemory for FileMemory {
    async fn load(&self, cancel: &CancellationToken) -> Result<(), ToolchatError> {
        if !self.config.enabled {
            return Ok(());
        }
        let path = self.path();
        let text = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ToolchatError::Cancelled),
            text = self.read_or_create(&path) => text?,
        };

        let sections = parse_sections(&text);
        debug!(path = %path.display(), sections = sections.len(), "loaded project memory");
        *self.sections.write().unwrap_or_else(PoisonError::into_inner) = Some(sections);
        Ok(())
    }

    fn context(&self) -> String {
        let guard = self.sections.read().unwrap_or_else(PoisonError::into_inner);
        let Some(sections) = guard.as_ref() else {
            return String::new();
        };

        let selected: Vec<&Section> = sections
            .iter()
            .filter(|s| self.config.sections.contains(&s.key))
            .collect();
        if selected.is_empty() {
            return String::new();
        }

        let mut out = String::from("# Project Memory\n\n");
        for section in selected {
            out.push_str(&format!("## {}\n\n{}\n\n", section.title, section.content));
        }
        out
    }
}

/// "Common Commands" -> "common_commands".
fn section_key(title: &str) -> String {
    let mut key = String::new();
    for c in title.trim().chars() {
        if c.is_alphanumeric() {
            key.extend(c.to_lowercase());
        } else if !key.is_empty() && !key.ends_with('_') {
            key.push('_');
        }
    }
    key.trim_end_matches('_').to_string()
}

fn close_section(sections: &mut [Section], body: &mut Vec<&str>) {
    if let Some(last) = sections.last_mut() {
        last.content = body.join("\n").trim().to_string();
    }
    body.clear();
}

fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(title) = line.strip_prefix("## ") {
            close_section(&mut sections, &mut body);
            sections.push(Section {
                key: section_key(title),
                title: title.trim().to_string(),
                content: String::new(),
            });
        } else if !sections.is_empty() {
            body.push(line);
        }
    }
    close_section(&mut sections, &mut body);
    sections
}

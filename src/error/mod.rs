//! Error types for toolchat.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Machine-checkable failure classification.
///
/// This is the `type` field of an execution error in the JSON output, so the
/// serialized names are part of the wire contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The model endpoint failed or was unreachable.
    AiError,
    /// The tool loop ran out of iterations.
    ToolError,
    ConfigError,
    InputError,
    IoError,
    FormatError,
}

/// Primary error type for all toolchat operations.
#[derive(Error, Debug)]
pub enum ToolchatError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Project memory not found: {}", .0.display())]
    MemoryNotFound(PathBuf),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ToolchatError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into the kind reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::ConfigParse(_) | Self::MemoryNotFound(_) => {
                ErrorKind::ConfigError
            }
            Self::Api { .. }
            | Self::Authentication(_)
            | Self::RateLimited { .. }
            | Self::Network(_)
            | Self::Cancelled => ErrorKind::AiError,
            Self::Timeout(_)
            | Self::ToolExecution { .. }
            | Self::ToolNotFound(_)
            | Self::DuplicateTool(_)
            | Self::InvalidArgument(_) => ErrorKind::ToolError,
            Self::Io(_) => ErrorKind::IoError,
            Self::Serialization(_) => ErrorKind::FormatError,
            Self::Input(_) => ErrorKind::InputError,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ToolchatError>;

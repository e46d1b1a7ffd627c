//! The finished result of one top-level execution.
//!
//! The JSON shape of [`ExecutionResult`] is the durable machine-readable
//! contract; field names must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::response::StopReason;
use super::usage::Usage;
use crate::error::ErrorKind;

/// Outcome of a whole execution, handed to a formatter once complete.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default)]
    pub response: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallResult>,
    #[serde(default)]
    pub tokens: TokenUsage,
    #[serde(default)]
    pub metadata: ExecutionMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl ExecutionResult {
    /// Mark the result failed. `success` and `error` always move together.
    pub fn fail(
        &mut self,
        kind: ErrorKind,
        message: impl Into<String>,
        details: Option<serde_json::Map<String, serde_json::Value>>,
    ) {
        self.success = false;
        self.error = Some(ErrorInfo {
            message: message.into(),
            kind,
            details,
        });
    }

    /// Error kind, if the execution failed.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// One dispatched tool call and what came of it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ToolCallResult {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Map<String, serde_json::Value>,
    pub duration_ms: u64,
    pub success: bool,
    /// A present `null` decodes as `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Token totals across all rounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt: u64,
    pub completion: u64,
    pub total: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cached: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cache_creation: u64,
}

impl From<Usage> for TokenUsage {
    fn from(usage: Usage) -> Self {
        Self {
            prompt: usage.input_tokens,
            completion: usage.output_tokens,
            total: usage.total_tokens,
            cached: usage.cache_read_tokens,
            cache_creation: usage.cache_creation_tokens,
        }
    }
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExecutionMetadata {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tools_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
}

/// A fatal execution error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorInfo {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}

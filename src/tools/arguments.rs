//! Typed access to tool call arguments.

use crate::error::ToolchatError;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone, Default)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Build from the input mapping the model sent.
    pub fn from_map(input: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self::new(serde_json::Value::Object(input.clone()))
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, ToolchatError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolchatError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an optional unsigned integer argument.
    pub fn get_u64_opt(&self, key: &str) -> Option<u64> {
        self.value.get(key).and_then(|v| v.as_u64())
    }

    /// Get a boolean argument, falling back to `default` when absent.
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.value
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, ToolchatError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            ToolchatError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}

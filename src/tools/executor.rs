//! Registry-backed tool invocation with per-call timeout and cancellation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::arguments::ToolArguments;
use super::registry::ToolRegistry;
use super::tool::ToolExecutionContext;
use super::types::{ToolDefinition, ToolResult};
use crate::error::ToolchatError;
use crate::util::with_timeout;

/// Default per-call tool timeout.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// The tool collaborator the orchestrator talks to.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Tools the model may call. Empty means tool use is unavailable.
    fn list_available(&self) -> Vec<ToolDefinition>;

    /// Run one named tool.
    async fn invoke(
        &self,
        cancel: &CancellationToken,
        name: &str,
        input: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolResult, ToolchatError>;
}

/// Resolves tool names against a [`ToolRegistry`] and runs them.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()), DEFAULT_TOOL_TIMEOUT)
    }
}

#[async_trait]
impl ToolInvoker for ToolExecutor {
    fn list_available(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    async fn invoke(
        &self,
        cancel: &CancellationToken,
        name: &str,
        input: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolResult, ToolchatError> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| ToolchatError::ToolNotFound(name.to_string()))?;

        let args = ToolArguments::from_map(input);
        let ctx = ToolExecutionContext {
            cancel: cancel.child_token(),
            tool_call_id: None,
        };

        debug!(tool = name, timeout_ms = self.timeout.as_millis() as u64, "invoking tool");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ToolchatError::Cancelled),
            result = with_timeout(self.timeout, tool.execute(&args, &ctx)) => result,
        }
    }
}

//! Convenience re-exports for common use.

pub use crate::config::ToolchatConfig;
pub use crate::error::{ErrorKind, Result, ToolchatError};
pub use crate::executor::{ExecuteOptions, Executor};
pub use crate::formatter::{new_formatter, Format, Formatter};
pub use crate::provider::AiClient;
pub use crate::tools::{AgentTool, Tool, ToolArguments, ToolExecutor, ToolInvoker, ToolParameters, ToolRegistry, ToolResult};
pub use crate::types::{ConversationMessage, ExecutionResult, ModelResponse, Role, StopReason, ToolCall, Usage};

//! Tool system for function calling.

pub mod arguments;
pub mod builtin;
pub mod executor;
pub mod registry;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use executor::{ToolExecutor, ToolInvoker, DEFAULT_TOOL_TIMEOUT};
pub use registry::ToolRegistry;
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use types::{ToolDefinition, ToolParameters, ToolResult};

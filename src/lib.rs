//! toolchat: tool-calling conversations with a language model.
//!
//! An [`Executor`](executor::Executor) sends a prompt to an
//! [`AiClient`](provider::AiClient), lets the model call local tools for up
//! to [`MAX_TOOL_ITERATIONS`](executor::MAX_TOOL_ITERATIONS) rounds, and
//! returns a fully populated [`ExecutionResult`](types::ExecutionResult).
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use toolchat::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> toolchat::error::Result<()> {
//! let config = ToolchatConfig::load(None)?;
//! let client = toolchat::provider::create_client(&config)?;
//! let registry = ToolRegistry::from_tools(toolchat::tools::builtin::all_tools())?;
//! let tools = ToolExecutor::new(Arc::new(registry), Duration::from_secs(30));
//!
//! let executor = Executor::new(client, Arc::new(tools)).with_provider(config.provider_name());
//! let options = ExecuteOptions::builder()
//!     .prompt("What does this project do?")
//!     .tools_enabled(true)
//!     .build();
//! let result = executor.execute(&CancellationToken::new(), options).await;
//! println!("{}", result.response);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod memory;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::ToolchatError;

//! CLI definitions for toolchat.

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::{ErrorKind, ToolchatError};
use crate::types::ExecutionResult;

/// Exit code for a successful run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for every failure other than tool iteration exhaustion.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when the tool loop hit its iteration limit.
pub const EXIT_TOOL_ERROR: i32 = 2;

/// toolchat: ask a model, let it use local tools
#[derive(Parser, Debug)]
#[command(name = "toolchat", version, about = "Tool-calling AI prompts from the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a prompt, letting the model call tools
    Exec(ExecArgs),
    /// List the built-in tools
    Tools,
}

/// Arguments for `toolchat exec`.
#[derive(Parser, Debug)]
pub struct ExecArgs {
    /// Output format (text, json, markdown)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable tool use
    #[arg(long)]
    pub no_tools: bool,

    /// Prefix configured project files to the prompt
    #[arg(long)]
    pub context: bool,

    /// Provider override
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model override
    #[arg(short, long)]
    pub model: Option<String>,

    /// Session identifier reported in metadata
    #[arg(short, long)]
    pub session: Option<String>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Prompt text; read from stdin when omitted
    pub prompt: Option<String>,
}

/// Error raised before or after an execution, carrying its exit code.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct ExecError {
    pub code: i32,
    pub kind: ErrorKind,
    pub source: ToolchatError,
}

impl From<ToolchatError> for ExecError {
    fn from(source: ToolchatError) -> Self {
        let kind = source.kind();
        Self {
            code: exit_code_for(kind),
            kind,
            source,
        }
    }
}

pub fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::ToolError => EXIT_TOOL_ERROR,
        _ => EXIT_FAILURE,
    }
}

/// Exit code for a finished execution.
pub fn exit_code_for_result(result: &ExecutionResult) -> i32 {
    match result.error_kind() {
        None if result.success => EXIT_SUCCESS,
        None => EXIT_FAILURE,
        Some(kind) => exit_code_for(kind),
    }
}

/// Resolve the prompt from the argument, or from stdin when it is piped.
pub fn get_prompt(arg: Option<String>) -> Result<String, ToolchatError> {
    let stdin = std::io::stdin();
    if arg.is_none() && !stdin.is_terminal() {
        return resolve_prompt(None, Some(&mut stdin.lock()));
    }
    resolve_prompt(arg, None)
}

/// Prompt resolution over an explicit reader.
pub fn resolve_prompt(arg: Option<String>, stdin: Option<&mut dyn Read>) -> Result<String, ToolchatError> {
    let raw = match (arg, stdin) {
        (Some(arg), _) => arg,
        (None, Some(reader)) => {
            let mut buf = String::new();
            reader.read_to_string(&mut buf)?;
            buf
        }
        (None, None) => String::new(),
    };

    let prompt = raw.trim();
    if prompt.is_empty() {
        return Err(ToolchatError::Input(
            "no prompt given; pass it as an argument or pipe it on stdin".into(),
        ));
    }
    Ok(prompt.to_string())
}

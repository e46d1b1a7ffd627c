//! Output formatters for a finished [`ExecutionResult`].

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::ExecutionResult;

/// Caller-selected output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Format {
    #[default]
    Text,
    Json,
    Markdown,
}

impl Format {
    /// Parse a format name, falling back to [`Format::Text`].
    pub fn parse_or_default(name: &str) -> Self {
        name.trim().parse().unwrap_or_default()
    }
}

/// Writes a result to a sink. Sink errors are returned unchanged.
pub trait Formatter: Send + Sync {
    fn format(&self, out: &mut dyn Write, result: &ExecutionResult) -> io::Result<()>;
}

pub fn new_formatter(format: Format) -> Box<dyn Formatter> {
    match format {
        Format::Text => Box::new(TextFormatter),
        Format::Json => Box::new(JsonFormatter),
        Format::Markdown => Box::new(MarkdownFormatter),
    }
}

fn error_message(result: &ExecutionResult) -> Option<&str> {
    result.error.as_ref().map(|e| e.message.as_str())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format(&self, out: &mut dyn Write, result: &ExecutionResult) -> io::Result<()> {
        match error_message(result) {
            Some(message) => writeln!(out, "Error: {message}"),
            None => writeln!(out, "{}", result.response),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
    fn format(&self, out: &mut dyn Write, result: &ExecutionResult) -> io::Result<()> {
        if let Some(message) = error_message(result) {
            return writeln!(out, "# Error\n\n{message}");
        }

        writeln!(out, "{}", result.response)?;
        if !result.tool_calls.is_empty() {
            write!(out, "\n---\n\n## Tool Executions ({})\n\n", result.tool_calls.len())?;
            for (idx, call) in result.tool_calls.iter().enumerate() {
                let glyph = if call.success { "✅" } else { "❌" };
                writeln!(out, "{}. {glyph} **{}** ({}ms)", idx + 1, call.tool, call.duration_ms)?;
            }
        }
        Ok(())
    }
}

/// Pretty-printed JSON (two-space indent) with a trailing newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, out: &mut dyn Write, result: &ExecutionResult) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, result).map_err(io::Error::from)?;
        out.write_all(b"\n")
    }
}

//! Conversation orchestrator: drives the bounded model/tool round loop.
//!
//! One call to [`Executor::execute`] ends in exactly one terminal state:
//!
//! - `SIMPLE`: tools disabled or none available; one plain request.
//! - `DONE`: the model produced a final answer.
//! - `FAILED`: the AI client returned an error (`ai_error`).
//! - `EXHAUSTED`: [`MAX_TOOL_ITERATIONS`] rounds without a final answer
//!   (`tool_error`).
//!
//! Failures are encoded in the returned [`ExecutionResult`], never raised.

pub mod dispatch;
pub mod render;

use std::sync::Arc;
use std::time::Instant;

use bon::Builder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::context::ContextGatherer;
use crate::error::ErrorKind;
use crate::memory::ProjectMemory;
use crate::provider::AiClient;
use crate::tools::{ToolDefinition, ToolInvoker};
use crate::types::{
    combine_usage, ConversationMessage, ExecutionMetadata, ExecutionResult, TokenUsage, Usage,
};

pub use dispatch::dispatch_tool_calls;
pub use render::{continuation_message, render_tool_results};

/// Upper bound on AI-client rounds per execution.
pub const MAX_TOOL_ITERATIONS: usize = 10;

/// Options for one execution.
#[derive(Debug, Clone, Builder)]
pub struct ExecuteOptions {
    #[builder(into)]
    pub prompt: String,
    #[builder(default)]
    pub tools_enabled: bool,
    #[builder(into)]
    pub session_id: Option<String>,
    /// Prefix gathered context to the prompt (tool loop only).
    #[builder(default)]
    pub include_context: bool,
}

pub struct Executor {
    client: Arc<dyn AiClient>,
    tools: Arc<dyn ToolInvoker>,
    provider: String,
    system_prompt: String,
    memory: Option<Arc<dyn ProjectMemory>>,
    context: Option<Arc<dyn ContextGatherer>>,
}

impl Executor {
    /// `tools` may be empty; executions then take the simple path.
    pub fn new(client: Arc<dyn AiClient>, tools: Arc<dyn ToolInvoker>) -> Self {
        Self {
            client,
            tools,
            provider: String::new(),
            system_prompt: String::new(),
            memory: None,
            context: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_memory(mut self, memory: Arc<dyn ProjectMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_context_gatherer(mut self, context: Arc<dyn ContextGatherer>) -> Self {
        self.context = Some(context);
        self
    }

    /// Run one prompt to completion.
    ///
    /// `cancel` is forwarded to every client and tool call; the loop itself
    /// only stops through a terminal state.
    pub async fn execute(&self, cancel: &CancellationToken, options: ExecuteOptions) -> ExecutionResult {
        let start = Instant::now();
        let mut result = ExecutionResult {
            metadata: ExecutionMetadata {
                model: self.client.model_name().to_string(),
                provider: if self.provider.is_empty() {
                    "unknown".to_string()
                } else {
                    self.provider.clone()
                },
                session_id: options.session_id.clone(),
                timestamp: chrono::Utc::now(),
                tools_enabled: options.tools_enabled,
                ..Default::default()
            },
            ..Default::default()
        };

        let tools = if options.tools_enabled {
            self.tools.list_available()
        } else {
            Vec::new()
        };

        if tools.is_empty() {
            self.run_simple(cancel, &options.prompt, &mut result).await;
        } else {
            self.run_tool_loop(cancel, &options, &tools, &mut result).await;
        }

        result.metadata.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    async fn run_simple(&self, cancel: &CancellationToken, prompt: &str, result: &mut ExecutionResult) {
        debug!("SIMPLE: single request without tools");
        match self.client.send_simple(cancel, prompt).await {
            Ok(text) => {
                result.success = true;
                result.response = text;
            }
            Err(e) => {
                warn!(error = %e, "FAILED: simple request");
                result.fail(ErrorKind::AiError, e.to_string(), None);
            }
        }
    }

    async fn run_tool_loop(
        &self,
        cancel: &CancellationToken,
        options: &ExecuteOptions,
        tools: &[ToolDefinition],
        result: &mut ExecutionResult,
    ) {
        let prompt = self.seed_prompt(options).await;
        let cache_hint = self.memory_hint(cancel).await;
        let mut messages = vec![ConversationMessage::user(prompt)];
        let mut usage: Option<Usage> = None;
        let mut accumulated = String::new();

        debug!(tools = tools.len(), "LOOPING: entering tool loop");
        for iteration in 0..MAX_TOOL_ITERATIONS {
            let response = match self
                .client
                .send_with_tools_and_history(cancel, &self.system_prompt, &cache_hint, &messages, tools)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(iteration, error = %e, "FAILED: AI client error");
                    let mut details = serde_json::Map::new();
                    details.insert("iteration".into(), iteration.into());
                    result.tokens = totals(usage);
                    result.fail(ErrorKind::AiError, e.to_string(), Some(details));
                    return;
                }
            };

            usage = combine_usage(usage, response.usage);

            if !response.wants_tools() {
                debug!(iteration, stop_reason = %response.stop_reason, "DONE");
                accumulated.push_str(&response.content);
                result.success = true;
                result.response = accumulated;
                result.tokens = totals(usage);
                result.metadata.stop_reason = Some(response.stop_reason);
                return;
            }

            debug!(iteration, calls = response.tool_calls.len(), "dispatching tool calls");
            let outcomes = dispatch_tool_calls(self.tools.as_ref(), cancel, &response.tool_calls).await;

            if !response.content.is_empty() {
                accumulated.push_str(&response.content);
                accumulated.push_str("\n\n");
                messages.push(ConversationMessage::assistant(response.content));
            }
            messages.push(ConversationMessage::user(continuation_message(&outcomes)));
            result.tool_calls.extend(outcomes);
        }

        warn!(max_iterations = MAX_TOOL_ITERATIONS, "EXHAUSTED: tool iteration limit reached");
        let mut details = serde_json::Map::new();
        details.insert("max_iterations".into(), MAX_TOOL_ITERATIONS.into());
        result.tokens = totals(usage);
        result.fail(
            ErrorKind::ToolError,
            format!("exceeded maximum tool iterations ({MAX_TOOL_ITERATIONS})"),
            Some(details),
        );
    }

    async fn seed_prompt(&self, options: &ExecuteOptions) -> String {
        if !options.include_context {
            return options.prompt.clone();
        }
        let Some(gatherer) = &self.context else {
            return options.prompt.clone();
        };
        match gatherer.gather().await {
            Ok(context) if !context.is_empty() => format!("{context}\n\n{}", options.prompt),
            Ok(_) => options.prompt.clone(),
            Err(e) => {
                debug!(error = %e, "context gathering failed, using bare prompt");
                options.prompt.clone()
            }
        }
    }

    async fn memory_hint(&self, cancel: &CancellationToken) -> String {
        let Some(memory) = &self.memory else {
            return String::new();
        };
        if let Err(e) = memory.load(cancel).await {
            debug!(error = %e, "project memory unavailable");
        }
        memory.context()
    }
}

fn totals(usage: Option<Usage>) -> TokenUsage {
    usage.map(TokenUsage::from).unwrap_or_default()
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("model", &self.client.model_name())
            .field("provider", &self.provider)
            .field("memory", &self.memory.is_some())
            .field("context", &self.context.is_some())
            .finish()
    }
}

//! Shared test helpers: a scripted AI client and fake collaborators.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use toolchat::context::ContextGatherer;
use toolchat::error::ToolchatError;
use toolchat::memory::ProjectMemory;
use toolchat::provider::AiClient;
use toolchat::tools::*;
use toolchat::types::*;

/// What the client saw on one tool-loop round.
#[derive(Debug, Clone)]
pub struct RecordedRound {
    pub system_prompt: String,
    pub cache_hint: String,
    pub messages: Vec<ConversationMessage>,
    pub tool_names: Vec<String>,
    pub cancelled: bool,
}

/// A client that replays queued responses in order.
///
/// Once the round queue is drained it repeats the `always` response if set,
/// otherwise it ends the turn with "Mock response".
pub struct MockClient {
    model: String,
    simple: Mutex<VecDeque<Result<String, ToolchatError>>>,
    rounds: Mutex<VecDeque<Result<ModelResponse, ToolchatError>>>,
    fallback: Mutex<Option<ModelResponse>>,
    recorded: Mutex<Vec<RecordedRound>>,
    simple_prompts: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            simple: Mutex::new(VecDeque::new()),
            rounds: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(None),
            recorded: Mutex::new(Vec::new()),
            simple_prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_simple(&self, reply: Result<String, ToolchatError>) {
        self.simple.lock().unwrap().push_back(reply);
    }

    pub fn queue_round(&self, reply: Result<ModelResponse, ToolchatError>) {
        self.rounds.lock().unwrap().push_back(reply);
    }

    /// Queue a tool-use round calling `name` with `input`.
    pub fn queue_tool_call(&self, content: &str, name: &str, input: serde_json::Value, usage: Usage) {
        self.queue_round(Ok(tool_use(content, name, input).with_usage(usage)));
    }

    pub fn queue_text(&self, content: &str, usage: Usage) {
        self.queue_round(Ok(ModelResponse::end_turn(content).with_usage(usage)));
    }

    pub fn always(&self, response: ModelResponse) {
        *self.fallback.lock().unwrap() = Some(response);
    }

    pub fn rounds(&self) -> Vec<RecordedRound> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn round_count(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }

    pub fn simple_prompts(&self) -> Vec<String> {
        self.simple_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiClient for MockClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn send_simple(&self, _cancel: &CancellationToken, prompt: &str) -> Result<String, ToolchatError> {
        self.simple_prompts.lock().unwrap().push(prompt.to_string());
        self.simple
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Mock response".to_string()))
    }

    async fn send_with_tools_and_history(
        &self,
        cancel: &CancellationToken,
        system_prompt: &str,
        cache_hint: &str,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse, ToolchatError> {
        self.recorded.lock().unwrap().push(RecordedRound {
            system_prompt: system_prompt.to_string(),
            cache_hint: cache_hint.to_string(),
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
            cancelled: cancel.is_cancelled(),
        });

        let queued = self.rounds.lock().unwrap().pop_front();
        if let Some(reply) = queued {
            return reply;
        }
        match self.fallback.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => Ok(ModelResponse::end_turn("Mock response")),
        }
    }
}

pub fn usage(input: u64, output: u64) -> Usage {
    Usage {
        input_tokens: input,
        output_tokens: output,
        total_tokens: input + output,
        ..Default::default()
    }
}

pub fn tool_use(content: &str, name: &str, input: serde_json::Value) -> ModelResponse {
    let input = match input {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    ModelResponse::tool_use(
        content,
        vec![ToolCall {
            id: format!("toolu_{name}"),
            name: name.to_string(),
            input,
        }],
    )
}

/// Tools used across orchestrator tests: `echo` succeeds, `explode` errors.
pub fn test_registry() -> ToolRegistry {
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(AgentTool::new(
            "echo",
            "Echo the given text",
            ToolParameters::object().string("text", "Text to echo", true).build(),
            |args, _ctx| async move { Ok(ToolResult::ok(args.get_str("text")?)) },
        )),
        Arc::new(AgentTool::new(
            "explode",
            "Always fails",
            ToolParameters::empty(),
            |_, _| async { Err(ToolchatError::tool("explode", "kaboom")) },
        )),
    ];
    ToolRegistry::from_tools(tools).unwrap()
}

/// Wraps a [`ToolExecutor`] and counts how often it is consulted.
pub struct CountingInvoker {
    inner: ToolExecutor,
    listed: AtomicUsize,
    invoked: AtomicUsize,
}

impl CountingInvoker {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            inner: ToolExecutor::new(Arc::new(registry), DEFAULT_TOOL_TIMEOUT),
            listed: AtomicUsize::new(0),
            invoked: AtomicUsize::new(0),
        }
    }

    pub fn invocations(&self) -> usize {
        self.invoked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolInvoker for CountingInvoker {
    fn list_available(&self) -> Vec<ToolDefinition> {
        self.listed.fetch_add(1, Ordering::SeqCst);
        self.inner.list_available()
    }

    async fn invoke(
        &self,
        cancel: &CancellationToken,
        name: &str,
        input: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolResult, ToolchatError> {
        self.invoked.fetch_add(1, Ordering::SeqCst);
        self.inner.invoke(cancel, name, input).await
    }
}

/// Memory with fixed context whose load can be made to fail.
pub struct StaticMemory {
    pub text: String,
    pub fail_load: bool,
}

#[async_trait]
impl ProjectMemory for StaticMemory {
    async fn load(&self, _cancel: &CancellationToken) -> Result<(), ToolchatError> {
        if self.fail_load {
            return Err(ToolchatError::MemoryNotFound("MEMORY.md".into()));
        }
        Ok(())
    }

    fn context(&self) -> String {
        self.text.clone()
    }
}

/// Context gatherer returning a fixed result.
pub struct StaticContext(pub Result<String, String>);

#[async_trait]
impl ContextGatherer for StaticContext {
    async fn gather(&self) -> Result<String, ToolchatError> {
        self.0.clone().map_err(ToolchatError::Input)
    }
}

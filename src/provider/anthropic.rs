//! Anthropic Messages API client.

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ToolchatError;
use crate::tools::ToolDefinition;
use crate::types::{ConversationMessage, ModelResponse, Role, StopReason, ToolCall, Usage};

use super::http::{anthropic_headers, shared_client, status_to_error};
use super::AiClient;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

pub struct AnthropicClient {
    model: String,
    api_key: String,
    base_url: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_request_body(
        &self,
        system_prompt: &str,
        cache_hint: &str,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> serde_json::Value {
        let mut system_blocks = Vec::new();
        let mut system_text = system_prompt.to_string();

        // Anthropic takes system content out-of-band.
        for msg in messages.iter().filter(|m| m.role == Role::System) {
            if !system_text.is_empty() {
                system_text.push_str("\n\n");
            }
            system_text.push_str(&msg.content);
        }
        if !system_text.is_empty() {
            system_blocks.push(serde_json::json!({"type": "text", "text": system_text}));
        }
        if !cache_hint.is_empty() {
            system_blocks.push(serde_json::json!({
                "type": "text",
                "text": cache_hint,
                "cache_control": {"type": "ephemeral"},
            }));
        }

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": merge_turns(messages),
            "max_tokens": self.max_tokens,
        });

        if let Some(obj) = body.as_object_mut() {
            if !system_blocks.is_empty() {
                obj.insert("system".into(), system_blocks.into());
            }
            if !tools.is_empty() {
                let tool_defs: Vec<serde_json::Value> = tools
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "name": t.name,
                            "description": t.description,
                            "input_schema": t.input_schema,
                        })
                    })
                    .collect();
                obj.insert("tools".into(), tool_defs.into());
            }
        }

        body
    }

    async fn send_request(&self, body: &serde_json::Value) -> Result<AnthropicResponse, ToolchatError> {
        let url = format!("{}/messages", self.base_url);
        debug!(model = %self.model, "Anthropic messages request");

        let resp = shared_client()
            .post(&url)
            .headers(anthropic_headers(&self.api_key, API_VERSION))
            .json(body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        Ok(resp.json().await?)
    }

    async fn post_messages(
        &self,
        cancel: &CancellationToken,
        body: &serde_json::Value,
    ) -> Result<AnthropicResponse, ToolchatError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ToolchatError::Cancelled),
            result = self.send_request(body) => result,
        }
    }
}

/// Collapse consecutive user/assistant messages with the same role; the
/// Messages API requires alternating turns.
fn merge_turns(messages: &[ConversationMessage]) -> Vec<serde_json::Value> {
    let mut merged: Vec<(Role, String)> = Vec::new();
    for msg in messages.iter().filter(|m| m.role != Role::System) {
        match merged.last_mut() {
            Some((role, content)) if *role == msg.role => {
                content.push_str("\n\n");
                content.push_str(&msg.content);
            }
            _ => merged.push((msg.role, msg.content.clone())),
        }
    }

    merged
        .into_iter()
        .map(|(role, content)| {
            let role = match role {
                Role::Assistant => "assistant",
                _ => "user",
            };
            serde_json::json!({"role": role, "content": content})
        })
        .collect()
}

#[async_trait]
impl AiClient for AnthropicClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn send_simple(&self, cancel: &CancellationToken, prompt: &str) -> Result<String, ToolchatError> {
        let body = self.build_request_body("", "", &[ConversationMessage::user(prompt)], &[]);
        let data = self.post_messages(cancel, &body).await?;
        Ok(data.into_model_response().content)
    }

    async fn send_with_tools_and_history(
        &self,
        cancel: &CancellationToken,
        system_prompt: &str,
        cache_hint: &str,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse, ToolchatError> {
        let body = self.build_request_body(system_prompt, cache_hint, messages, tools);
        let data = self.post_messages(cancel, &body).await?;
        let response = data.into_model_response();
        debug!(
            stop_reason = %response.stop_reason,
            tool_calls = response.tool_calls.len(),
            "Anthropic messages response"
        );
        Ok(response)
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

// Internal Anthropic response types

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    r#type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
    #[serde(default)]
    cache_read_input_tokens: Option<u64>,
    #[serde(default)]
    cache_creation_input_tokens: Option<u64>,
}

impl AnthropicResponse {
    fn into_model_response(self) -> ModelResponse {
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in self.content {
            match block.r#type.as_str() {
                "text" => {
                    if let Some(t) = block.text {
                        text.push_str(&t);
                    }
                }
                "tool_use" => {
                    if let (Some(id), Some(name)) = (block.id, block.name) {
                        let input = match block.input {
                            Some(serde_json::Value::Object(map)) => map,
                            _ => serde_json::Map::new(),
                        };
                        tool_calls.push(ToolCall { id, name, input });
                    }
                }
                _ => {}
            }
        }

        let stop_reason = match self.stop_reason.as_deref() {
            Some("tool_use") => StopReason::ToolUse,
            Some("max_tokens") => StopReason::MaxTokens,
            _ => StopReason::EndTurn,
        };

        ModelResponse {
            content: text,
            stop_reason,
            tool_calls,
            usage: self.usage.map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
                cache_read_tokens: u.cache_read_input_tokens.unwrap_or(0),
                cache_creation_tokens: u.cache_creation_input_tokens.unwrap_or(0),
            }),
        }
    }
}

//! AI client trait and provider implementations.

pub mod http;

#[cfg(feature = "anthropic")]
pub mod anthropic;

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::ToolchatConfig;
use crate::error::ToolchatError;
use crate::tools::ToolDefinition;
use crate::types::{ConversationMessage, ModelResponse};

/// The model endpoint the orchestrator sends rounds to.
///
/// Every call is a single request; implementations do not retry.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Model identifier reported in execution metadata.
    fn model_name(&self) -> &str;

    /// One plain prompt, no tools, no history.
    async fn send_simple(&self, cancel: &CancellationToken, prompt: &str) -> Result<String, ToolchatError>;

    /// One round with the full conversation and the available tool schemas.
    ///
    /// `cache_hint` is sent only to enable provider-side prompt caching; it
    /// is never part of the visible conversation.
    async fn send_with_tools_and_history(
        &self,
        cancel: &CancellationToken,
        system_prompt: &str,
        cache_hint: &str,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse, ToolchatError>;
}

/// Build the client named by `config.ai.provider`.
pub fn create_client(config: &ToolchatConfig) -> Result<Arc<dyn AiClient>, ToolchatError> {
    match config.ai.provider.as_str() {
        #[cfg(feature = "anthropic")]
        "anthropic" => {
            let api_key = config
                .ai
                .api_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    ToolchatError::Configuration("ANTHROPIC_API_KEY is not set".into())
                })?;
            let client = anthropic::AnthropicClient::new(
                config.ai.model.clone(),
                api_key,
                config.ai.base_url.clone(),
            )
            .with_max_tokens(config.ai.max_tokens);
            Ok(Arc::new(client))
        }
        other => Err(ToolchatError::Configuration(format!(
            "unsupported provider: {other:?}"
        ))),
    }
}

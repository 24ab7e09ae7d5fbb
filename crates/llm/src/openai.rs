//! Chat-Completions Provider
//!
//! Implementation of the `LlmProvider` trait for OpenAI-compatible
//! chat-completions APIs. Covers both OpenRouter and OpenAI proper, which
//! share the same wire format.

use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::{build_http_client, DEFAULT_REQUEST_TIMEOUT};
use super::provider::{parse_http_error, LlmProvider};
use super::types::{LlmError, LlmResult, ProviderConfig, ProviderKind};

/// Provider speaking the OpenAI chat-completions wire format.
pub struct ChatCompletionsProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

/// Response body for a non-streaming chat completion.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl ChatCompletionsProvider {
    /// Create a new provider with the given configuration.
    pub fn new(config: ProviderConfig) -> Self {
        let client = build_http_client(DEFAULT_REQUEST_TIMEOUT);
        Self { config, client }
    }

    /// Create a provider from environment variables.
    ///
    /// See [`ProviderConfig::from_env`] for the resolution order.
    pub fn from_env() -> LlmResult<Self> {
        Ok(Self::new(ProviderConfig::from_env()?))
    }

    /// Build the request body for the API.
    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt,
                }
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        })
    }

    /// Send the request and extract the first choice's message content.
    async fn send(&self, body: serde_json::Value) -> LlmResult<String> {
        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(
                provider = %self.config.kind,
                status = status.as_u16(),
                "chat completion request failed"
            );
            return Err(parse_http_error(status.as_u16(), &text, self.name()));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| LlmError::Parse {
            message: format!("invalid chat completion response: {}", e),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Parse {
                message: "response contained no choices".to_string(),
            })
    }
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    fn name(&self) -> &'static str {
        match self.config.kind {
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::OpenAi => "openai",
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        let body = self.build_request_body(prompt);
        self.send(body).await
    }

    async fn health_check(&self) -> LlmResult<()> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": "ping"}],
            "max_tokens": 1,
        });
        self.send(body).await.map(|_| ())
    }
}

//! LLM Types
//!
//! Core types for LLM provider interactions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported LLM backend kinds.
///
/// Both speak the OpenAI chat-completions wire format; they differ only in
/// endpoint, default model, and which environment variable carries the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenRouter,
    OpenAi,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenRouter => write!(f, "openrouter"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

impl ProviderKind {
    /// Default chat-completions endpoint for this backend.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ProviderKind::OpenRouter => "https://openrouter.ai/api/v1/chat/completions",
            ProviderKind::OpenAi => "https://api.openai.com/v1/chat/completions",
        }
    }

    /// Default model for this backend.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenRouter => "anthropic/claude-sonnet-4",
            ProviderKind::OpenAi => "gpt-3.5-turbo",
        }
    }
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

/// Configuration for an LLM provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The backend kind
    pub kind: ProviderKind,
    /// API key
    pub api_key: String,
    /// Base URL override (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model name to use
    pub model: String,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl ProviderConfig {
    /// Build a configuration from environment variables.
    ///
    /// `OPENROUTER_API_KEY` takes precedence over `OPENAI_API_KEY`; with
    /// neither set there is no usable backend and the agent cannot run.
    /// `OPENROUTER_API_BASE_URL` / `OPENAI_API_BASE_URL` override the
    /// endpoint, `TOOLFORGE_MODEL` overrides the model.
    pub fn from_env() -> LlmResult<Self> {
        let (kind, api_key, base_url) = if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            (
                ProviderKind::OpenRouter,
                key,
                std::env::var("OPENROUTER_API_BASE_URL").ok(),
            )
        } else if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            (
                ProviderKind::OpenAi,
                key,
                std::env::var("OPENAI_API_BASE_URL").ok(),
            )
        } else {
            return Err(LlmError::NotConfigured {
                message: "neither OPENROUTER_API_KEY nor OPENAI_API_KEY is set".to_string(),
            });
        };

        let model = std::env::var("TOOLFORGE_MODEL")
            .unwrap_or_else(|_| kind.default_model().to_string());

        Ok(Self {
            kind,
            api_key,
            base_url,
            model,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        })
    }

    /// The effective endpoint URL for this configuration.
    pub fn endpoint(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.kind.default_endpoint())
    }
}

/// Errors returned by LLM providers.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Authentication failed (invalid or missing API key)
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Rate limit exceeded
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// Invalid request (bad parameters)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Server error from the provider
    #[error("Server error: {message}")]
    ServerError { message: String, status: Option<u16> },

    /// Network/connection error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response parsing error
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// No backend configured at all
    #[error("No LLM backend configured: {message}")]
    NotConfigured { message: String },

    /// Other error
    #[error("{message}")]
    Other { message: String },
}

/// Result type alias for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;

//! LLM Provider Trait
//!
//! Defines the common interface for all LLM providers.

use async_trait::async_trait;

use super::types::{LlmError, LlmResult};

/// Trait that all LLM providers must implement.
///
/// The agent consumes providers through this seam only, so tests can swap in
/// canned-response mocks without any network access.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the current model being used.
    fn model(&self) -> &str;

    /// Send a single prompt and return the complete text response.
    async fn complete(&self, prompt: &str) -> LlmResult<String>;

    /// Check if the provider is healthy and reachable.
    ///
    /// Validates the API key with a minimal round trip.
    async fn health_check(&self) -> LlmResult<()>;
}

/// Helper function to create an error for a missing API key.
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Helper function to map HTTP error status codes to `LlmError`.
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    match status {
        401 | 403 => LlmError::AuthenticationFailed {
            message: format!("{}: {}", provider, body),
        },
        429 => LlmError::RateLimited {
            message: body.to_string(),
        },
        400 | 404 => LlmError::InvalidRequest {
            message: body.to_string(),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}

//! Toolforge LLM
//!
//! Provides a unified interface for talking to OpenAI-compatible LLM
//! backends:
//! - OpenRouter (preferred when `OPENROUTER_API_KEY` is set)
//! - OpenAI (fallback via `OPENAI_API_KEY`)
//!
//! Both speak the chat-completions wire format, so a single provider
//! implementation covers them.

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::ChatCompletionsProvider;
pub use provider::LlmProvider;
pub use types::{LlmError, LlmResult, ProviderConfig, ProviderKind};

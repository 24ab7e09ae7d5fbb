//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients with a request
//! timeout applied.

use std::time::Duration;

/// Default per-request timeout for LLM calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build a `reqwest::Client` with the given request timeout.
///
/// `ClientBuilder::build` only fails when TLS backend initialization fails;
/// in that case the default client (no timeout) is the only usable fallback.
pub fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A persisted tool record could not be read back
    #[error("Corrupt tool record: {0}")]
    CorruptStore(String),

    /// Generated code failed validation
    #[error("Code rejected: {0}")]
    CodeRejected(String),

    /// Tool creation exhausted its retry budget
    #[error("Tool creation failed after {attempts} attempts: {reason}")]
    ToolCreationFailed { attempts: u32, reason: String },

    /// The user declined a dependency installation
    #[error("Dependency installation declined: {0}")]
    DependencyDeclined(String),

    /// Subprocess/command execution errors
    #[error("Command error: {0}")]
    Command(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(#[from] toolforge_llm::LlmError),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a corrupt-store error
    pub fn corrupt_store(msg: impl Into<String>) -> Self {
        Self::CorruptStore(msg.into())
    }

    /// Create a code-rejected error
    pub fn code_rejected(msg: impl Into<String>) -> Self {
        Self::CodeRejected(msg.into())
    }

    /// Create a command error
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<toolforge_core::CoreError> for AppError {
    fn from(err: toolforge_core::CoreError) -> Self {
        match err {
            toolforge_core::CoreError::Io(e) => Self::Io(e),
            toolforge_core::CoreError::Serialization(e) => Self::Serialization(e),
            toolforge_core::CoreError::NotFound(msg) => Self::NotFound(msg),
            toolforge_core::CoreError::Config(msg) => Self::Config(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Convert AppError to a string suitable for CLI-facing messages
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}

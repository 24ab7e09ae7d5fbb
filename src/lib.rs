//! Toolforge - LLM Task Agent Library
//!
//! An LLM-driven task agent that grows its own tool library: tasks are
//! decomposed into steps, each step is matched against stored tools, and
//! missing tools are generated, validated, persisted, and executed.
//! It includes:
//! - The tool store (JSON file-per-record persistence)
//! - Lexical tool matching and the tool lifecycle
//! - Subprocess execution with timeout and dependency prompting
//! - LLM-backed collaborators (task analysis, code generation, GitHub search)

pub mod config;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::AgentConfig;
pub use models::tool::{QueryContext, ScoredMatch, ToolRecord};
pub use services::{
    Agent, Executor, ExecutorConfig, GithubSearcher, InstallPrompt, LifecycleConfig,
    LifecycleManager, LlmCodeGenerator, LlmTaskDecomposer, TerminalPrompt,
};
pub use storage::tool_store::ToolStore;
pub use utils::error::{AppError, AppResult};

//! Services
//!
//! Business logic services for the application: tool matching, lifecycle,
//! execution, and the LLM-backed collaborators.

pub mod agent;
pub mod analyzer;
pub mod codegen;
pub mod executor;
pub mod github;
pub mod lifecycle;
pub mod matcher;
pub mod validation;

pub use agent::{Agent, StepOutcome};
pub use analyzer::LlmTaskDecomposer;
pub use codegen::LlmCodeGenerator;
pub use executor::{ExecutionResult, Executor, ExecutorConfig, ExitStatus, InstallPrompt, TerminalPrompt};
pub use github::GithubSearcher;
pub use lifecycle::{LifecycleConfig, LifecycleManager, LifecycleState, ResolvedTool};
pub use matcher::{best_match, score_tool, MATCH_THRESHOLD};

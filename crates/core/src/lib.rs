//! Toolforge Core
//!
//! Foundational error types and collaborator traits for the Toolforge
//! workspace. This crate has zero dependencies on application-level code
//! (storage, LLM providers, subprocess execution, etc.).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `collaborators` - External collaborator traits (`TaskDecomposer`,
//!   `CodeGenerator`, `SnippetSearcher`) and their data types
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/async-trait/thiserror** - keeps build times minimal
//! 2. **Trait-based abstractions** - enables mocking, testing, and future crate splitting
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod collaborators;
pub mod error;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Collaborator Traits ────────────────────────────────────────────────
pub use collaborators::{
    CodeGenerator, GenerationRequest, SnippetSearcher, TaskAnalysis, TaskDecomposer, TaskStep,
    ToolCandidate, NO_TOOL_NEEDED,
};

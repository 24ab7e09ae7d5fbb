//! External Collaborator Traits
//!
//! Defines the seams between the agent core and its external collaborators:
//!
//! - `TaskDecomposer` - turns a natural-language task into ordered steps
//! - `CodeGenerator` - produces tool source code for an unmatched step
//! - `SnippetSearcher` - finds candidate open-source tools to build on
//!
//! Splitting these into separate traits keeps each consumer mockable in
//! isolation: the lifecycle manager only needs a `CodeGenerator` (and
//! optionally a `SnippetSearcher`), while the outer agent loop owns the
//! `TaskDecomposer`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;

/// Sentinel value used by the decomposer when no external tool is required.
pub const NO_TOOL_NEEDED: &str = "no_extra_tools_needed";

/// One actionable unit produced by task decomposition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStep {
    /// What needs to be done in this step.
    pub description: String,
    /// Whether this step needs an external tool.
    pub requires_tool: bool,
    /// The type of tool needed (e.g. "weather api"), or "no_tool".
    #[serde(default)]
    pub tool_type: Option<String>,
}

/// Full decomposition of a user task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAnalysis {
    /// Whether any external tool/API is needed at all.
    pub needs_external_tool: bool,
    /// Ordered steps; empty when no external tool is needed.
    #[serde(default)]
    pub steps: Vec<TaskStep>,
    /// The primary tool needed, or [`NO_TOOL_NEEDED`].
    pub main_required_tool: String,
    /// General description of what the main tool should do.
    ///
    /// This must describe the *class* of problem, not the literal user
    /// question, so that generated tools stay reusable.
    #[serde(default)]
    pub tool_general_description: String,
}

impl TaskAnalysis {
    /// Whether the analysis concluded that no tool is required.
    pub fn is_direct_answer(&self) -> bool {
        !self.needs_external_tool || self.main_required_tool == NO_TOOL_NEEDED
    }
}

/// Request handed to the code-generation collaborator.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Target language (fixed to the host scripting language, "python").
    pub language: String,
    /// Usage guide for the library/API the tool should build on.
    pub usage_guide: String,
    /// General description of the capability to implement.
    pub general_description: String,
    /// Rejection reason from a previous validation failure, if any.
    /// Fed back so the generator can self-correct.
    pub previous_rejection: Option<String>,
}

/// A candidate open-source tool found by the snippet searcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCandidate {
    /// Repository/tool name.
    pub name: String,
    /// Short description of the candidate.
    pub description: String,
    /// Star count, used in candidate scoring.
    pub stars: u64,
    /// Repository URL.
    pub url: String,
    /// Candidate score in [0, 100].
    pub score: f64,
    /// Extracted installation instructions.
    pub installation: String,
    /// Extracted usage instructions.
    pub usage: String,
}

/// Turns a natural-language task into an ordered sequence of steps.
///
/// Consumed once per user request.
#[async_trait]
pub trait TaskDecomposer: Send + Sync {
    async fn decompose(&self, task: &str) -> CoreResult<TaskAnalysis>;
}

/// Produces tool source code for a step that has no stored match.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Generate source code for the requested capability.
    ///
    /// Returns the raw source text; cleaning and validation happen on the
    /// caller's side before anything is persisted or executed.
    async fn generate(&self, request: &GenerationRequest) -> CoreResult<String>;

    /// Extract executable install commands from an installation guide.
    async fn extract_install_commands(&self, installation_guide: &str) -> CoreResult<Vec<String>>;
}

/// Finds candidate code to build a new tool on.
///
/// Consulted optionally before falling back to pure generation; any returned
/// candidate is subject to the same validation as generated code.
#[async_trait]
pub trait SnippetSearcher: Send + Sync {
    async fn find_candidate(
        &self,
        tool_type: &str,
        description: &str,
    ) -> CoreResult<Option<ToolCandidate>>;
}

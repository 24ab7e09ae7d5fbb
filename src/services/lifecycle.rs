//! Tool Lifecycle
//!
//! Drives a step's tool need through its states: match against the store,
//! reuse on a hit, otherwise generate, validate, and persist a new tool.
//! Generation is bounded; validation failures feed their reason back into
//! the next attempt.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use toolforge_core::{CodeGenerator, GenerationRequest, SnippetSearcher};

use crate::models::tool::{QueryContext, ToolRecord};
use crate::services::matcher::{self, MATCH_THRESHOLD};
use crate::services::validation;
use crate::storage::tool_store::ToolStore;
use crate::utils::error::{AppError, AppResult};

/// States a tool request moves through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    /// Scoring stored tools against the query.
    Matching,
    /// A stored tool scored at or above the threshold.
    Matched { tool_id: String },
    /// No stored tool qualified.
    Unmatched,
    /// Asking the generator for new code (attempt is 1-based).
    Generating { attempt: u32 },
    /// Generated code failed validation.
    Rejected { reason: String },
    /// A new tool was validated and persisted.
    Created { tool_id: String },
    /// The retry budget ran out.
    Failed,
}

/// Tunable knobs for the lifecycle.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Minimum match score for reuse (inclusive).
    pub match_threshold: f64,
    /// Maximum code-generation attempts before giving up.
    pub max_generation_attempts: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            match_threshold: MATCH_THRESHOLD,
            max_generation_attempts: 2,
        }
    }
}

/// Outcome of a resolve call.
#[derive(Debug, Clone)]
pub struct ResolvedTool {
    pub record: ToolRecord,
    /// Whether an existing tool was reused rather than created.
    pub reused: bool,
}

/// Resolves a step's tool need against the store, creating a tool when
/// nothing matches.
pub struct LifecycleManager<'a> {
    store: &'a mut ToolStore,
    generator: &'a dyn CodeGenerator,
    searcher: Option<&'a dyn SnippetSearcher>,
    config: LifecycleConfig,
    state: LifecycleState,
}

impl<'a> LifecycleManager<'a> {
    pub fn new(
        store: &'a mut ToolStore,
        generator: &'a dyn CodeGenerator,
        searcher: Option<&'a dyn SnippetSearcher>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            generator,
            searcher,
            config,
            state: LifecycleState::Matching,
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    /// Resolve `query` to a usable tool record.
    ///
    /// `general_description` is the class-of-problem description from task
    /// decomposition; it, not the literal user question, is what a new
    /// tool is generated from, so tools stay reusable.
    pub async fn resolve(
        &mut self,
        query: &QueryContext,
        general_description: &str,
    ) -> AppResult<ResolvedTool> {
        self.state = LifecycleState::Matching;

        if let Some(hit) =
            matcher::best_match(self.store.list_all(), query, self.config.match_threshold)
        {
            info!(tool_id = %hit.tool_id, score = hit.score, "reusing stored tool");
            self.state = LifecycleState::Matched {
                tool_id: hit.tool_id.clone(),
            };
            let record = self
                .store
                .get(&hit.tool_id)
                .cloned()
                .ok_or_else(|| AppError::internal("matched tool vanished from store"))?;
            return Ok(ResolvedTool {
                record,
                reused: true,
            });
        }

        self.state = LifecycleState::Unmatched;
        debug!("no stored tool qualified, creating a new one");
        self.create_tool(query, general_description).await
    }

    async fn create_tool(
        &mut self,
        query: &QueryContext,
        general_description: &str,
    ) -> AppResult<ResolvedTool> {
        let tool_type = query
            .tool_type_hint
            .clone()
            .unwrap_or_else(|| general_description.to_string());

        // An open-source candidate, when available, supplies a usage guide
        // and install commands; its absence only means generating from
        // scratch.
        let candidate = match self.searcher {
            Some(searcher) => match searcher.find_candidate(&tool_type, general_description).await
            {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "snippet search failed, generating from scratch");
                    None
                }
            },
            None => None,
        };

        let (usage_guide, installation_guide) = match &candidate {
            Some(c) => {
                info!(name = %c.name, score = c.score, "building on open-source candidate");
                (c.usage.clone(), Some(c.installation.clone()))
            }
            None => (String::new(), None),
        };

        let mut previous_rejection: Option<String> = None;
        let mut last_reason = String::new();

        for attempt in 1..=self.config.max_generation_attempts {
            self.state = LifecycleState::Generating { attempt };
            debug!(attempt, "requesting code generation");

            let request = GenerationRequest {
                language: "python".to_string(),
                usage_guide: usage_guide.clone(),
                general_description: general_description.to_string(),
                previous_rejection: previous_rejection.clone(),
            };

            let raw = self.generator.generate(&request).await?;

            match validation::validate(&raw) {
                Ok(code) => {
                    let install_dependencies = match &installation_guide {
                        Some(guide) => {
                            self.generator.extract_install_commands(guide).await?
                        }
                        None => Vec::new(),
                    };

                    let keywords = derive_keywords(general_description, query);
                    let record = ToolRecord::new(
                        &tool_type,
                        general_description.to_string(),
                        keywords,
                        install_dependencies,
                        code,
                    );
                    self.store.save(&record)?;
                    info!(tool_id = %record.id, attempt, "created new tool");
                    self.state = LifecycleState::Created {
                        tool_id: record.id.clone(),
                    };
                    return Ok(ResolvedTool {
                        record,
                        reused: false,
                    });
                }
                Err(AppError::CodeRejected(reason)) => {
                    warn!(attempt, %reason, "generated code rejected");
                    self.state = LifecycleState::Rejected {
                        reason: reason.clone(),
                    };
                    last_reason = reason.clone();
                    previous_rejection = Some(reason);
                }
                Err(other) => return Err(other),
            }
        }

        self.state = LifecycleState::Failed;
        Err(AppError::ToolCreationFailed {
            attempts: self.config.max_generation_attempts,
            reason: last_reason,
        })
    }
}

/// Derive matcher keywords from the general description and the query.
///
/// Heuristic token extraction with an English stopword filter; CJK tokens
/// come through the same tokenizer one character at a time.
pub fn derive_keywords(general_description: &str, query: &QueryContext) -> BTreeSet<String> {
    const STOPWORDS: &[&str] = &[
        "the", "for", "and", "any", "with", "that", "this", "from", "into", "data", "tool",
        "using", "can", "will", "all", "are", "was", "has", "have", "its", "not", "you",
    ];

    let mut keywords = matcher::tokenize(general_description);
    if let Some(hint) = &query.tool_type_hint {
        keywords.extend(matcher::tokenize(hint));
    }
    keywords.retain(|k| !STOPWORDS.contains(&k.as_str()));
    keywords
}

//! Agent Orchestration
//!
//! The outer loop tying everything together: decompose a task, walk its
//! steps sequentially (match, reuse or create, prepare, run), answer
//! tool-free tasks directly, and synthesize a final natural-language answer
//! from the collected step outputs.
//!
//! Tool-level failures become per-step outcomes and never abort the task;
//! only a corrupt store or a missing LLM backend is fatal.

use tracing::{info, warn};

use toolforge_core::{CodeGenerator, SnippetSearcher, TaskDecomposer, TaskStep};
use toolforge_llm::LlmProvider;

use crate::models::tool::QueryContext;
use crate::services::executor::{ExecutionResult, Executor, ExitStatus, InstallPrompt};
use crate::services::lifecycle::{LifecycleConfig, LifecycleManager};
use crate::storage::tool_store::ToolStore;
use crate::utils::error::{AppError, AppResult};

/// Result of one step of a task.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub description: String,
    pub success: bool,
    pub detail: String,
}

/// The task agent.
pub struct Agent<'a, P> {
    store: &'a mut ToolStore,
    provider: &'a P,
    decomposer: &'a dyn TaskDecomposer,
    generator: &'a dyn CodeGenerator,
    searcher: Option<&'a dyn SnippetSearcher>,
    executor: &'a Executor,
    prompt: &'a dyn InstallPrompt,
    lifecycle_config: LifecycleConfig,
}

impl<'a, P: LlmProvider> Agent<'a, P> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: &'a mut ToolStore,
        provider: &'a P,
        decomposer: &'a dyn TaskDecomposer,
        generator: &'a dyn CodeGenerator,
        searcher: Option<&'a dyn SnippetSearcher>,
        executor: &'a Executor,
        prompt: &'a dyn InstallPrompt,
        lifecycle_config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            provider,
            decomposer,
            generator,
            searcher,
            executor,
            prompt,
            lifecycle_config,
        }
    }

    /// Handle one user task end to end, returning the answer text.
    pub async fn handle_task(&mut self, task: &str) -> AppResult<String> {
        if task.trim().eq_ignore_ascii_case("list tools") {
            return Ok(self.render_tool_list());
        }

        let analysis = self.decomposer.decompose(task).await?;

        if analysis.is_direct_answer() {
            info!("no external tool needed, answering directly");
            return self.direct_answer(task).await;
        }

        let mut outcomes: Vec<StepOutcome> = Vec::new();
        for step in &analysis.steps {
            if !step.requires_tool {
                outcomes.push(StepOutcome {
                    description: step.description.clone(),
                    success: true,
                    detail: String::new(),
                });
                continue;
            }

            let outcome = self
                .run_tool_step(step, &analysis.tool_general_description)
                .await?;
            let failed = !outcome.success;
            outcomes.push(outcome);
            if failed {
                // Later steps usually depend on this one's output.
                warn!(step = %step.description, "step failed, stopping task");
                break;
            }
        }

        self.synthesize(task, &outcomes).await
    }

    /// Run one tool-requiring step. Tool-level errors become a failed
    /// outcome; corrupt-store and I/O errors propagate.
    async fn run_tool_step(
        &mut self,
        step: &TaskStep,
        general_description: &str,
    ) -> AppResult<StepOutcome> {
        let query = match &step.tool_type {
            Some(hint) if hint != "no_tool" => {
                QueryContext::with_hint(step.description.clone(), hint.clone())
            }
            _ => QueryContext::new(step.description.clone()),
        };

        let mut lifecycle = LifecycleManager::new(
            self.store,
            self.generator,
            self.searcher,
            self.lifecycle_config.clone(),
        );

        let resolved = match lifecycle.resolve(&query, general_description).await {
            Ok(resolved) => resolved,
            Err(e @ AppError::CorruptStore(_)) => return Err(e),
            Err(e @ AppError::Io(_)) => return Err(e),
            Err(e) => {
                return Ok(StepOutcome {
                    description: step.description.clone(),
                    success: false,
                    detail: format!("could not obtain a tool: {}", e),
                });
            }
        };

        if resolved.reused {
            info!(tool_id = %resolved.record.id, "reusing tool for step");
        } else {
            info!(tool_id = %resolved.record.id, "created tool for step");
        }

        if let Err(e) = self.executor.prepare(&resolved.record, self.prompt).await {
            return Ok(StepOutcome {
                description: step.description.clone(),
                success: false,
                detail: format!("dependency preparation failed: {}", e),
            });
        }

        match self.executor.run(&resolved.record).await {
            Ok(result) => Ok(step_outcome_from_result(step, result)),
            Err(e) => Ok(StepOutcome {
                description: step.description.clone(),
                success: false,
                detail: format!("execution error: {}", e),
            }),
        }
    }

    async fn direct_answer(&self, question: &str) -> AppResult<String> {
        let prompt = format!(
            "Provide a clear and concise answer to this question:\n{}",
            question
        );
        Ok(self.provider.complete(&prompt).await?)
    }

    /// Compose the final answer from step outputs.
    async fn synthesize(&self, task: &str, outcomes: &[StepOutcome]) -> AppResult<String> {
        let mut report = String::new();
        for outcome in outcomes {
            let status = if outcome.success { "ok" } else { "failed" };
            report.push_str(&format!(
                "- [{}] {}: {}\n",
                status,
                outcome.description,
                outcome.detail.trim()
            ));
        }

        let prompt = format!(
            r#"A user asked: {task}

The following steps were executed, with their outputs:
{report}
Write a clear, natural-language answer to the user's question based on
these outputs. If a step failed, say plainly what could not be done."#
        );
        Ok(self.provider.complete(&prompt).await?)
    }

    fn render_tool_list(&self) -> String {
        let tools = self.store.list_all();
        if tools.is_empty() {
            return "No tools are currently available.".to_string();
        }
        let mut out = String::from("Available tools:\n");
        for tool in tools {
            out.push_str(&format!("  {}: {}\n", tool.id, tool.description));
        }
        out
    }
}

fn step_outcome_from_result(step: &TaskStep, result: ExecutionResult) -> StepOutcome {
    match result.exit_status {
        ExitStatus::Success => StepOutcome {
            description: step.description.clone(),
            success: true,
            detail: result.stdout,
        },
        ExitStatus::Failed(code) => StepOutcome {
            description: step.description.clone(),
            success: false,
            detail: format!("exited with code {}: {}", code, result.stderr),
        },
        ExitStatus::Timeout => StepOutcome {
            description: step.description.clone(),
            success: false,
            detail: "timed out".to_string(),
        },
    }
}

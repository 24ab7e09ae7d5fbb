//! Task Analysis
//!
//! LLM-backed `TaskDecomposer`: asks the model whether a task needs
//! external tools and, if so, for an ordered step plan as strict JSON.

use async_trait::async_trait;
use tracing::debug;

use toolforge_core::{CoreError, CoreResult, TaskAnalysis, TaskDecomposer};
use toolforge_llm::LlmProvider;

/// Decomposes tasks by prompting an LLM for a JSON step plan.
pub struct LlmTaskDecomposer<P> {
    provider: P,
}

impl<P: LlmProvider> LlmTaskDecomposer<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    fn build_prompt(task: &str) -> String {
        format!(
            r#"Analyze the following task and determine if it requires external tools or APIs.

CRITICAL: First determine if this task needs external tools:
- Tasks that ask about real-time data (weather, stock prices, news, etc.) need external tools
- Tasks that ask about general knowledge, explanations, or advice DO NOT need external tools
- Simple questions, greetings, or conversations DO NOT need external tools
- Mathematical calculations, text processing, or code generation usually DO NOT need external tools

Return a JSON object with these fields:
1. "needs_external_tool": true/false - Whether ANY external tool/API is needed
2. "steps": An array of step objects (ONLY if needs_external_tool is true), each containing:
   - "description": What needs to be done in this step
   - "requires_tool": true/false - whether this step needs an external tool
   - "tool_type": The type of tool needed (e.g. "weather api", "stock api", "no_tool") for this specific step
3. "main_required_tool": The primary tool needed (or "no_extra_tools_needed" if none needed)
4. "tool_general_description": A general description of what the main tool should do (empty string if no tool needed)

If needs_external_tool is false, steps should be an empty array.

The JSON must:
- Use double quotes for all strings and property names
- Have proper commas between elements
- Have no trailing commas
- Have no comments or additional text

Example for "What's the weather like in Tokyo?":
{{
    "needs_external_tool": true,
    "steps": [
        {{"description": "Get current weather data for Tokyo", "requires_tool": true, "tool_type": "weather api"}},
        {{"description": "Summarize the weather information and present to user", "requires_tool": false, "tool_type": "no_tool"}}
    ],
    "main_required_tool": "weather api",
    "tool_general_description": "A tool that fetches current weather data for any location"
}}

Example for "What is machine learning?":
{{
    "needs_external_tool": false,
    "steps": [],
    "main_required_tool": "no_extra_tools_needed",
    "tool_general_description": ""
}}

Now analyze this task and return a properly formatted JSON object:
Task: {task}"#
        )
    }
}

/// Cut the substring between the first `{` and the last `}`.
///
/// Models wrap JSON in prose or fences often enough that parsing the raw
/// response directly is not viable.
pub fn extract_json_object(response: &str) -> CoreResult<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| CoreError::parse("response contains no JSON object"))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| CoreError::parse("response contains no closing brace"))?;
    if end < start {
        return Err(CoreError::parse("malformed JSON object in response"));
    }
    Ok(&response[start..=end])
}

#[async_trait]
impl<P: LlmProvider> TaskDecomposer for LlmTaskDecomposer<P> {
    async fn decompose(&self, task: &str) -> CoreResult<TaskAnalysis> {
        let prompt = Self::build_prompt(task);
        let response = self
            .provider
            .complete(&prompt)
            .await
            .map_err(|e| CoreError::collaborator(e.to_string()))?;
        debug!(bytes = response.len(), "received task analysis");

        let json = extract_json_object(&response)?;
        let analysis: TaskAnalysis = serde_json::from_str(json)
            .map_err(|e| CoreError::parse(format!("invalid task analysis: {}", e)))?;
        Ok(analysis)
    }
}

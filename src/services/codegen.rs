//! Code Generation
//!
//! LLM-backed `CodeGenerator`: asks the model for implementation-only tool
//! code, and extracts executable install commands from installation guides
//! behind a conservative command whitelist.

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use toolforge_core::{CodeGenerator, CoreError, CoreResult, GenerationRequest};
use toolforge_llm::LlmProvider;

/// Generates tool code by prompting an LLM.
pub struct LlmCodeGenerator<P> {
    provider: P,
    /// Commands allowed out of install-command extraction.
    command_whitelist: Regex,
}

impl<P: LlmProvider> LlmCodeGenerator<P> {
    pub fn new(provider: P) -> Self {
        // Package-manager and python invocations only; anything else from
        // an installation guide never reaches the operator prompt.
        let command_whitelist = Regex::new(
            r"^(?:pip|pip3|npm|yarn|python|pytest|uvicorn|flask)\s+[a-zA-Z0-9._-]+(?:\s+[^|>&;]+)*$",
        )
        .expect("valid whitelist regex");
        Self {
            provider,
            command_whitelist,
        }
    }

    fn build_generation_prompt(request: &GenerationRequest) -> String {
        let mut prompt = format!(
            r#"Write ONLY the implementation code in {language} to solve this problem.

IMPORTANT:
1. Return ONLY the code implementation
2. NO documentation, explanations, or markdown
3. NO installation instructions or usage examples
4. Get ALL required inputs from the user during runtime using input()
5. NO hardcoded values or TODO comments

Example format:
import xyz

def main():
    value = input("Enter value: ")
    # implementation

if __name__ == "__main__":
    main()

Problem: {problem}
"#,
            language = request.language,
            problem = request.general_description,
        );

        if !request.usage_guide.is_empty() {
            prompt.push_str(&format!("Usage Guide: {}\n", request.usage_guide));
        }
        if let Some(rejection) = &request.previous_rejection {
            prompt.push_str(&format!(
                "\nYour previous attempt was rejected: {}\nFix that problem this time.\n",
                rejection
            ));
        }
        prompt
    }

    /// Keep only commands matching the whitelist.
    fn filter_commands(&self, commands: Vec<String>) -> Vec<String> {
        commands
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| {
                let allowed = self.command_whitelist.is_match(c);
                if !allowed && !c.is_empty() {
                    warn!(command = %c, "skipping non-whitelisted install command");
                }
                allowed
            })
            .collect()
    }
}

#[async_trait]
impl<P: LlmProvider> CodeGenerator for LlmCodeGenerator<P> {
    async fn generate(&self, request: &GenerationRequest) -> CoreResult<String> {
        let prompt = Self::build_generation_prompt(request);
        let code = self
            .provider
            .complete(&prompt)
            .await
            .map_err(|e| CoreError::collaborator(e.to_string()))?;
        debug!(bytes = code.len(), "received generated code");
        Ok(code)
    }

    async fn extract_install_commands(&self, installation_guide: &str) -> CoreResult<Vec<String>> {
        let prompt = format!(
            r#"From this installation guide, extract ONLY the essential commands for the simplest installation method.
- Choose only ONE installation method (prefer pip/pip3/npm over alternatives)
- Return ONLY a JSON array of command strings
- No descriptions, headers, or explanations
- No markdown formatting
- Commands must be directly executable

Installation Guide:
{installation_guide}

Example response:
["pip install package-name"]

Commands:"#
        );

        let response = self
            .provider
            .complete(&prompt)
            .await
            .map_err(|e| CoreError::collaborator(e.to_string()))?;

        let commands: Vec<String> = match extract_json_array(&response) {
            Some(json) => serde_json::from_str(json)
                .map_err(|e| CoreError::parse(format!("invalid command array: {}", e)))?,
            // No array in the response; fall back to line-wise extraction.
            None => response
                .lines()
                .map(|l| l.trim().trim_start_matches(['$', '>']).trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
        };

        Ok(self.filter_commands(commands))
    }
}

/// Cut the substring between the first `[` and the last `]`, if the
/// response holds one.
fn extract_json_array(response: &str) -> Option<&str> {
    let start = response.find('[')?;
    let end = response.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

//! Code Validation
//!
//! Static checks applied to generated code before it is persisted or
//! executed: markdown-fence stripping, whitespace cleanup, a denylist of
//! destructive operations, and a structural dry-parse. Rejection reasons
//! name the offending construct so the generator can self-correct on the
//! next attempt.

use tracing::debug;

use crate::utils::error::{AppError, AppResult};

/// Disallowed operations in generated code
const DISALLOWED_PATTERNS: &[&str] = &[
    "rm -rf /",
    "rm -rf /*",
    "rm -rf ~",
    "> /dev/sda",
    "dd if=/dev/zero",
    "mkfs.",
    ":(){ :|:& };:",
    "chmod -R 777 /",
    "shutil.rmtree('/')",
    "shutil.rmtree(\"/\")",
    "os.system('rm -rf",
    "os.system(\"rm -rf",
    "os.fork()",
    "while True: os.fork",
    "/etc/passwd",
    "/etc/shadow",
    "ssh/id_rsa",
    ".aws/credentials",
];

/// Strip a surrounding markdown code fence, if present.
///
/// LLMs routinely wrap code in ```python ... ``` even when told not to.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    // Opening fence, possibly with a language tag
    lines.remove(0);
    // Closing fence
    if lines.last().map(|l| l.trim().starts_with("```")) == Some(true) {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

/// Normalize whitespace: tabs to four spaces, trailing whitespace removed.
pub fn clean_code(code: &str) -> String {
    let mut cleaned: String = code
        .lines()
        .map(|line| line.replace('\t', "    ").trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    cleaned.push('\n');
    cleaned
}

/// Reject code containing any denylisted destructive operation.
fn check_denylist(code: &str) -> AppResult<()> {
    for pattern in DISALLOWED_PATTERNS {
        if code.contains(pattern) {
            return Err(AppError::code_rejected(format!(
                "contains disallowed operation '{}'",
                pattern
            )));
        }
    }
    Ok(())
}

/// Structural dry-parse: non-empty, balanced delimiters, sane indentation.
///
/// Not a real parser. Catches the common failure modes of truncated LLM
/// output (unclosed brackets, half a string literal) before anything is
/// persisted.
fn dry_parse(code: &str) -> AppResult<()> {
    if code.trim().is_empty() {
        return Err(AppError::code_rejected("code is empty"));
    }

    let chars: Vec<char> = code.chars().collect();
    let mut stack: Vec<char> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            // Rest of line is a comment; delimiter counting would misfire
            // on prose.
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '\'' | '"' => {
                let quote = ch;
                let triple =
                    i + 2 < chars.len() && chars[i + 1] == quote && chars[i + 2] == quote;
                i += if triple { 3 } else { 1 };

                let mut closed = false;
                while i < chars.len() {
                    if !triple && chars[i] == '\\' {
                        i += 2;
                        continue;
                    }
                    if chars[i] == quote {
                        if !triple {
                            closed = true;
                            i += 1;
                            break;
                        }
                        if i + 2 < chars.len() && chars[i + 1] == quote && chars[i + 2] == quote
                        {
                            closed = true;
                            i += 3;
                            break;
                        }
                    }
                    i += 1;
                }
                if !closed {
                    return Err(AppError::code_rejected("unterminated string literal"));
                }
                continue;
            }
            '(' | '[' | '{' => stack.push(ch),
            ')' => {
                if stack.pop() != Some('(') {
                    return Err(AppError::code_rejected("unbalanced parentheses"));
                }
            }
            ']' => {
                if stack.pop() != Some('[') {
                    return Err(AppError::code_rejected("unbalanced brackets"));
                }
            }
            '}' => {
                if stack.pop() != Some('{') {
                    return Err(AppError::code_rejected("unbalanced braces"));
                }
            }
            _ => {}
        }
        i += 1;
    }

    if !stack.is_empty() {
        return Err(AppError::code_rejected("unclosed delimiter"));
    }

    Ok(())
}

/// Full validation pipeline: strip fences, clean, denylist, dry-parse.
///
/// Returns the cleaned code on success.
pub fn validate(raw: &str) -> AppResult<String> {
    let code = clean_code(&strip_code_fences(raw));
    check_denylist(&code)?;
    dry_parse(&code)?;
    debug!(bytes = code.len(), "code passed validation");
    Ok(code)
}

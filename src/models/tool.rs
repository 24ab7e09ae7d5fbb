//! Tool Data Types
//!
//! Core types for the self-growing tool library: the in-memory record, its
//! persisted JSON form, and the ephemeral matching types.

use std::collections::BTreeSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A stored, reusable tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRecord {
    /// Unique ID: sanitized name + UTC timestamp suffix.
    ///
    /// The timestamp suffix makes id sort order equal creation order, which
    /// the store relies on to reconstruct insertion order after a restart.
    pub id: String,
    /// General description of the capability (the *class* of problem, not a
    /// literal user question).
    pub description: String,
    /// Normalized keywords used by the matcher.
    pub keywords: BTreeSet<String>,
    /// Shell commands that must run before first execution.
    pub install_dependencies: Vec<String>,
    /// The tool's source code.
    pub code: String,
}

impl ToolRecord {
    /// Create a new record with a fresh id derived from `name`.
    pub fn new(
        name: &str,
        description: String,
        keywords: BTreeSet<String>,
        install_dependencies: Vec<String>,
        code: String,
    ) -> Self {
        Self {
            id: generate_tool_id(name),
            description,
            keywords,
            install_dependencies,
            code,
        }
    }
}

/// Generate a tool id from a human-readable name.
///
/// Lowercases, maps non-alphanumeric runs to single underscores, and appends
/// a UTC timestamp so that ids sort in creation order.
pub fn generate_tool_id(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut last_was_sep = true;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                sanitized.push(lower);
            }
            last_was_sep = false;
        } else if !last_was_sep {
            sanitized.push('_');
            last_was_sep = true;
        }
    }
    let sanitized = sanitized.trim_end_matches('_');
    let base = if sanitized.is_empty() {
        "tool"
    } else {
        sanitized
    };
    format!("{}_{}", base, Utc::now().format("%Y%m%d%H%M%S"))
}

/// On-disk JSON form of a [`ToolRecord`].
///
/// Keywords are stored as a single space-separated string and the field
/// names differ from the in-memory record, so the persisted form is a
/// separate struct rather than serde attributes on `ToolRecord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedTool {
    pub id: String,
    pub tool_description: String,
    /// Space-separated keyword tokens.
    pub keywords: String,
    #[serde(default)]
    pub install_dependencies: Vec<String>,
    pub python_code: String,
}

impl From<&ToolRecord> for PersistedTool {
    fn from(record: &ToolRecord) -> Self {
        Self {
            id: record.id.clone(),
            tool_description: record.description.clone(),
            keywords: record
                .keywords
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(" "),
            install_dependencies: record.install_dependencies.clone(),
            python_code: record.code.clone(),
        }
    }
}

impl From<PersistedTool> for ToolRecord {
    fn from(persisted: PersistedTool) -> Self {
        Self {
            id: persisted.id,
            description: persisted.tool_description,
            keywords: persisted
                .keywords
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            install_dependencies: persisted.install_dependencies,
            code: persisted.python_code,
        }
    }
}

/// Ephemeral query context for tool matching.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// The step description to match against.
    pub step_description: String,
    /// Optional tool-type hint from task decomposition.
    pub tool_type_hint: Option<String>,
}

impl QueryContext {
    pub fn new(step_description: impl Into<String>) -> Self {
        Self {
            step_description: step_description.into(),
            tool_type_hint: None,
        }
    }

    pub fn with_hint(step_description: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            step_description: step_description.into(),
            tool_type_hint: Some(hint.into()),
        }
    }

    /// The full query text: description plus hint, if any.
    pub fn query_text(&self) -> String {
        match &self.tool_type_hint {
            Some(hint) => format!("{} {}", self.step_description, hint),
            None => self.step_description.clone(),
        }
    }
}

/// A scored match against a stored tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub tool_id: String,
    /// Relevance score in [0, 1].
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> ToolRecord {
        ToolRecord {
            id: "weather_fetcher_20260101120000".to_string(),
            description: "Fetches current weather data for any location".to_string(),
            keywords: ["weather", "forecast", "temperature"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            install_dependencies: vec!["pip install requests".to_string()],
            code: "import requests\nprint('ok')\n".to_string(),
        }
    }

    #[test]
    fn test_generate_tool_id_sanitizes() {
        let id = generate_tool_id("Weather Fetcher! v2");
        assert!(id.starts_with("weather_fetcher_v2_"));
        assert!(!id.contains(' '));
        assert!(!id.contains('!'));
    }

    #[test]
    fn test_generate_tool_id_empty_name() {
        let id = generate_tool_id("!!!");
        assert!(id.starts_with("tool_"));
    }

    #[test]
    fn test_persisted_round_trip() {
        let record = make_record();
        let persisted = PersistedTool::from(&record);
        assert_eq!(persisted.tool_description, record.description);
        assert_eq!(persisted.keywords, "forecast temperature weather");

        let restored: ToolRecord = persisted.into();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_persisted_json_field_names() {
        let record = make_record();
        let json = serde_json::to_value(PersistedTool::from(&record)).unwrap();
        assert!(json.get("tool_description").is_some());
        assert!(json.get("python_code").is_some());
        assert!(json["keywords"].is_string());
    }

    #[test]
    fn test_persisted_missing_dependencies_defaults_empty() {
        let json = r#"{
            "id": "x_20260101120000",
            "tool_description": "d",
            "keywords": "a b",
            "python_code": "print(1)"
        }"#;
        let persisted: PersistedTool = serde_json::from_str(json).unwrap();
        let record: ToolRecord = persisted.into();
        assert!(record.install_dependencies.is_empty());
        assert_eq!(record.keywords.len(), 2);
    }

    #[test]
    fn test_query_text_includes_hint() {
        let ctx = QueryContext::with_hint("get stock price", "stock api");
        assert_eq!(ctx.query_text(), "get stock price stock api");

        let ctx = QueryContext::new("get stock price");
        assert_eq!(ctx.query_text(), "get stock price");
    }
}

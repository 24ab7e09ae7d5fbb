//! Agent Configuration
//!
//! Runtime knobs for the agent: data locations, match threshold, execution
//! timeout, and the generation retry budget. Defaults are serde-backed so a
//! partial config file or env override set still yields a full config.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::services::matcher::MATCH_THRESHOLD;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths;

fn default_match_threshold() -> f64 {
    MATCH_THRESHOLD
}

fn default_execution_timeout_secs() -> u64 {
    60
}

fn default_max_generation_attempts() -> u32 {
    2
}

fn default_interpreter() -> String {
    "python3".to_string()
}

/// Agent runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Directory holding tool records. Defaults to `~/.toolforge/tools`.
    #[serde(default)]
    pub tools_dir: Option<PathBuf>,
    /// Scratch root for tool runs. Defaults to `~/.toolforge/workspace`.
    #[serde(default)]
    pub workspace_dir: Option<PathBuf>,
    /// Minimum match score for tool reuse (inclusive).
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    /// Per-run wall-clock limit in seconds.
    #[serde(default = "default_execution_timeout_secs")]
    pub execution_timeout_secs: u64,
    /// Code-generation retry budget.
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: u32,
    /// Interpreter binary used to run tools.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            tools_dir: None,
            workspace_dir: None,
            match_threshold: default_match_threshold(),
            execution_timeout_secs: default_execution_timeout_secs(),
            max_generation_attempts: default_max_generation_attempts(),
            interpreter: default_interpreter(),
        }
    }
}

impl AgentConfig {
    /// Apply `TOOLFORGE_*` environment overrides on top of the defaults.
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("TOOLFORGE_TOOLS_DIR") {
            config.tools_dir = Some(PathBuf::from(dir));
        }
        if let Ok(dir) = std::env::var("TOOLFORGE_WORKSPACE_DIR") {
            config.workspace_dir = Some(PathBuf::from(dir));
        }
        if let Ok(raw) = std::env::var("TOOLFORGE_MATCH_THRESHOLD") {
            config.match_threshold = raw
                .parse()
                .map_err(|_| AppError::config(format!("invalid match threshold: {}", raw)))?;
        }
        if let Ok(raw) = std::env::var("TOOLFORGE_EXECUTION_TIMEOUT_SECS") {
            config.execution_timeout_secs = raw
                .parse()
                .map_err(|_| AppError::config(format!("invalid execution timeout: {}", raw)))?;
        }
        if let Ok(raw) = std::env::var("TOOLFORGE_MAX_GENERATION_ATTEMPTS") {
            config.max_generation_attempts = raw
                .parse()
                .map_err(|_| AppError::config(format!("invalid attempt count: {}", raw)))?;
        }
        if let Ok(bin) = std::env::var("TOOLFORGE_INTERPRETER") {
            config.interpreter = bin;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(AppError::config(format!(
                "match threshold {} outside [0, 1]",
                self.match_threshold
            )));
        }
        if self.max_generation_attempts == 0 {
            return Err(AppError::config("at least one generation attempt required"));
        }
        if self.execution_timeout_secs == 0 {
            return Err(AppError::config("execution timeout must be positive"));
        }
        Ok(())
    }

    /// Effective tools directory.
    pub fn tools_dir(&self) -> AppResult<PathBuf> {
        match &self.tools_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::tools_dir(),
        }
    }

    /// Effective workspace directory.
    pub fn workspace_dir(&self) -> AppResult<PathBuf> {
        match &self.workspace_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::workspace_dir(),
        }
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.execution_timeout_secs)
    }
}

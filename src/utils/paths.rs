//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Everything lives under ~/.toolforge/.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Toolforge directory (~/.toolforge/)
pub fn toolforge_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".toolforge"))
}

/// Get the tool store directory (~/.toolforge/tools/)
pub fn tools_dir() -> AppResult<PathBuf> {
    Ok(toolforge_dir()?.join("tools"))
}

/// Get the execution workspace directory (~/.toolforge/workspace/)
pub fn workspace_dir() -> AppResult<PathBuf> {
    Ok(toolforge_dir()?.join("workspace"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the tool store directory, creating if it doesn't exist
pub fn ensure_tools_dir() -> AppResult<PathBuf> {
    let path = tools_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}

/// Get the workspace directory, creating if it doesn't exist
pub fn ensure_workspace_dir() -> AppResult<PathBuf> {
    let path = workspace_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_dir() {
        let home = home_dir();
        assert!(home.is_ok());
        assert!(home.unwrap().exists());
    }

    #[test]
    fn test_toolforge_dir() {
        let dir = toolforge_dir();
        assert!(dir.is_ok());
        assert!(dir.unwrap().to_string_lossy().contains(".toolforge"));
    }

    #[test]
    fn test_tools_dir() {
        let path = tools_dir();
        assert!(path.is_ok());
        assert!(path.unwrap().to_string_lossy().contains("tools"));
    }

    #[test]
    fn test_ensure_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.exists());
    }
}

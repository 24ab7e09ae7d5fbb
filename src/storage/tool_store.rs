//! Tool Store
//!
//! File-per-record JSON persistence for the tool library. The whole
//! directory is loaded at startup; writes go through a temp-file-then-rename
//! so a crash mid-write never leaves a half-written record behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::models::tool::{PersistedTool, ToolRecord};
use crate::utils::error::{AppError, AppResult};

/// In-memory view of the on-disk tool library.
///
/// Records are keyed by id; because ids carry a UTC timestamp suffix, the
/// key order equals creation order.
#[derive(Debug)]
pub struct ToolStore {
    dir: PathBuf,
    records: BTreeMap<String, ToolRecord>,
}

impl ToolStore {
    /// Load every record from `dir`.
    ///
    /// A missing directory means an empty store. A file that cannot be read
    /// or parsed is a `CorruptStore` error, surfaced rather than silently
    /// dropped: a tool the user relies on must not vanish without a trace.
    pub fn load(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        let mut records = BTreeMap::new();

        if !dir.exists() {
            debug!(dir = %dir.display(), "tool store directory missing, starting empty");
            return Ok(Self { dir, records });
        }

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let record = Self::read_record(&path)?;
            records.insert(record.id.clone(), record);
        }

        debug!(count = records.len(), dir = %dir.display(), "loaded tool store");
        Ok(Self { dir, records })
    }

    fn read_record(path: &Path) -> AppResult<ToolRecord> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::corrupt_store(format!("{}: {}", path.display(), e)))?;
        let persisted: PersistedTool = serde_json::from_str(&content)
            .map_err(|e| AppError::corrupt_store(format!("{}: {}", path.display(), e)))?;
        let record: ToolRecord = persisted.into();
        if record.keywords.is_empty() {
            return Err(AppError::corrupt_store(format!(
                "{}: record has no keywords",
                path.display()
            )));
        }
        Ok(record)
    }

    /// Insert or overwrite a record, persisting it atomically.
    pub fn save(&mut self, record: &ToolRecord) -> AppResult<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        let persisted = PersistedTool::from(record);
        let content = serde_json::to_string_pretty(&persisted)?;

        let file_path = self.dir.join(format!("{}.json", record.id));

        // Write atomically by writing to temp file then renaming
        let temp_path = file_path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;

        // On Windows, we need to remove the destination first if it exists
        if file_path.exists() {
            fs::remove_file(&file_path)?;
        }
        fs::rename(&temp_path, &file_path)?;

        debug!(id = %record.id, "saved tool record");
        self.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    /// All records in insertion order.
    pub fn list_all(&self) -> Vec<&ToolRecord> {
        self.records.values().collect()
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Option<&ToolRecord> {
        self.records.get(id)
    }

    /// Number of stored tools.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no tools.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove a record from memory and disk.
    pub fn remove(&mut self, id: &str) -> AppResult<bool> {
        if self.records.remove(id).is_none() {
            return Ok(false);
        }
        let file_path = self.dir.join(format!("{}.json", id));
        if file_path.exists() {
            fs::remove_file(&file_path)?;
        } else {
            warn!(id, "removed record had no backing file");
        }
        Ok(true)
    }
}

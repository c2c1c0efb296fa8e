//! Persistence port for the history log: load/save with atomic writes

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use crate::models::HistoryEntry;

/// Where the history log is kept between runs.
///
/// The whole log is saved as one serialized array. `clear` removes the stored
/// value entirely rather than saving an empty array.
pub trait HistoryStore: Send {
    /// Load the stored log. A store with nothing in it loads as an empty log;
    /// unreadable or malformed contents are an error.
    fn load(&self) -> Result<Vec<HistoryEntry>>;

    fn save(&self, entries: &[HistoryEntry]) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// JSON array on disk, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history file: {}", self.path.display()))?;
        let entries = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse history file: {}", self.path.display()))?;
        Ok(entries)
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create history directory")?;
        }

        // Write atomically (temp file + rename)
        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let json = serde_json::to_string(entries).context("Failed to serialize history")?;
        fs::write(&temp_path, json).context("Failed to write history temp file")?;
        fs::rename(&temp_path, &self.path).context("Failed to rename history temp file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove history file: {}", self.path.display())
            })?;
        }
        Ok(())
    }
}

/// In-memory store holding the serialized log, shared between clones.
///
/// Used by tests and anywhere a disk is not wanted. Keeping the raw
/// string lets callers seed malformed data and tell "removed" from "empty".
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    raw: Arc<Mutex<Option<String>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self { raw: Arc::new(Mutex::new(Some(raw.into()))) }
    }

    /// Currently stored serialized log, `None` when nothing is stored
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>> {
        match self.raw() {
            Some(json) => serde_json::from_str(&json).context("Failed to parse stored history"),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        let json = serde_json::to_string(entries).context("Failed to serialize history")?;
        *self.raw.lock().unwrap_or_else(|e| e.into_inner()) = Some(json);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.raw.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::MemoryError;
use crate::types::{Memory, SessionObservation};

/// Provides access to the memory document on disk.
///
/// Every update reads the whole document, merges, and writes the whole
/// document back. There is no locking: a single session is expected to
/// finalize at a time.
pub struct MemoryStore {
    path: PathBuf,
}

impl MemoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Return the memory file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the memory document, or empty defaults if the file does not exist.
    pub fn load(&self) -> Result<Memory, MemoryError> {
        if !self.path.exists() {
            debug!(path = ?self.path, "No memory file yet, starting empty");
            return Ok(Memory::default());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| MemoryError::Read {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| MemoryError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the full memory document, creating the parent directory if needed.
    pub fn save(&self, memory: &Memory) -> Result<(), MemoryError> {
        let json = serde_json::to_string_pretty(memory)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| MemoryError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(&self.path, json).map_err(|source| MemoryError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Merge a reflected session into the stored memory and persist it.
    pub fn record_reflection(
        &self,
        observation: &SessionObservation<'_>,
        fired: &[String],
    ) -> Result<Memory, MemoryError> {
        let memory = self.load()?;
        self.merge_and_save(memory, observation, fired)
    }

    /// Merge a reflected session into a memory already obtained from
    /// [`load`](Self::load) and persist it.
    pub fn merge_and_save(
        &self,
        mut memory: Memory,
        observation: &SessionObservation<'_>,
        fired: &[String],
    ) -> Result<Memory, MemoryError> {
        memory.merge(observation, fired);
        self.save(&memory)?;

        debug!(
            path = ?self.path,
            total_sessions = memory.stats.total_sessions,
            keywords = memory.search_index.len(),
            "Memory updated"
        );

        Ok(memory)
    }
}

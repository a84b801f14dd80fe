use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::entry::{format_entry, next_label, SessionLabel};
use crate::error::ReflectError;
use crate::metrics::MetricsRecord;

/// Written once when the log file is first created.
pub const LOG_HEADER: &str = "# Reflection Sessions

Chronological log of debug sessions and learnings.

---
";

/// Append-only markdown log of reflection entries.
pub struct ReflectionLog {
    path: PathBuf,
}

impl ReflectionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current log contents, `None` if the log does not exist yet.
    pub fn read(&self) -> Result<Option<String>, ReflectError> {
        if !self.path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|source| ReflectError::LogRead {
                path: self.path.clone(),
                source,
            })
    }

    pub fn next_label(&self) -> Result<SessionLabel, ReflectError> {
        next_label(self.read()?.as_deref())
    }

    /// Format an entry for `record` under the next free label and append it,
    /// creating the log (with its header) if needed.
    pub fn append(
        &self,
        record: &MetricsRecord,
        triggers: &[String],
    ) -> Result<(SessionLabel, String), ReflectError> {
        let existing = self.read()?;
        let label = next_label(existing.as_deref())?;
        let entry = format_entry(record, triggers, label);

        let write_err = |source: std::io::Error| ReflectError::LogWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;

        if existing.is_none() {
            file.write_all(LOG_HEADER.as_bytes()).map_err(write_err)?;
        }
        file.write_all(entry.as_bytes()).map_err(write_err)?;

        debug!(path = ?self.path, %label, "Reflection entry appended");
        Ok((label, entry))
    }
}

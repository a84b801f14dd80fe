use std::path::PathBuf;

use serde::Serialize;

use crate::metrics::MetricsRecord;

/// Result of finalizing a session
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReflectionOutcome {
    /// At least one trigger fired; an entry was appended and memory updated
    Reflected {
        record: MetricsRecord,
        label: String,
        triggers: Vec<String>,
        #[serde(skip)]
        entry: String,
        log_path: PathBuf,
        memory_path: PathBuf,
        total_sessions: u64,
        keywords_indexed: usize,
    },
    /// No trigger fired; nothing was written
    Skipped { record: MetricsRecord },
}

impl ReflectionOutcome {
    pub fn is_reflected(&self) -> bool {
        matches!(self, Self::Reflected { .. })
    }

    /// The appended markdown entry, if one was written.
    pub fn entry(&self) -> Option<&str> {
        match self {
            Self::Reflected { entry, .. } => Some(entry.as_str()),
            Self::Skipped { .. } => None,
        }
    }

    pub fn triggers(&self) -> &[String] {
        match self {
            Self::Reflected { triggers, .. } => triggers.as_slice(),
            Self::Skipped { .. } => &[],
        }
    }

    pub fn record(&self) -> &MetricsRecord {
        match self {
            Self::Reflected { record, .. } => record,
            Self::Skipped { record } => record,
        }
    }
}

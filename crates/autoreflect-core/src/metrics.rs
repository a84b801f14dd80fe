use autoreflect_memory::SessionObservation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one session's observations, taken when the session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_errors: usize,
    pub max_consecutive_errors: usize,
    pub recovery_mode_entered: bool,
    pub features_attempted: usize,
    /// Not checked against `features_attempted`.
    pub features_completed: usize,
    /// Distinct, in the order they were first blocked.
    pub blocked_features: Vec<String>,
    /// Distinct error messages, each at most 100 characters.
    pub error_patterns: Vec<String>,
}

impl MetricsRecord {
    /// Whole minutes between start and end. A clock that went backwards
    /// yields zero.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes().max(0)
    }

    /// Fraction of attempted features that were completed, if any were attempted.
    pub fn completion_ratio(&self) -> Option<f64> {
        if self.features_attempted == 0 {
            return None;
        }
        Some(self.features_completed as f64 / self.features_attempted as f64)
    }

    pub fn observation(&self) -> SessionObservation<'_> {
        SessionObservation {
            session_id: &self.session_id,
            end_time: self.end_time,
            total_errors: self.total_errors,
            error_patterns: &self.error_patterns,
        }
    }
}

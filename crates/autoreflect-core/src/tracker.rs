use std::collections::BTreeSet;

use autoreflect_memory::MemoryStore;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::ReflectError;
use crate::journal::ReflectionLog;
use crate::metrics::MetricsRecord;
use crate::outcome::ReflectionOutcome;
use crate::paths::ReflectionPaths;
use crate::trigger::TriggerEvaluator;

/// Error messages are truncated to this many characters before storing.
pub const MAX_ERROR_MESSAGE_CHARS: usize = 100;

/// Collects observations while a session runs.
///
/// [`finalize`](Self::finalize) consumes the tracker, so a session can only
/// be reflected once.
pub struct SessionTracker {
    session_id: String,
    start_time: DateTime<Utc>,
    error_count: usize,
    consecutive_errors: usize,
    max_consecutive_errors: usize,
    recovery_mode_entered: bool,
    features_attempted: BTreeSet<String>,
    features_completed: BTreeSet<String>,
    blocked_features: Vec<String>,
    error_messages: Vec<String>,
    paths: ReflectionPaths,
    evaluator: TriggerEvaluator,
}

impl SessionTracker {
    /// Start tracking with an identifier derived from the start time.
    pub fn new(paths: ReflectionPaths) -> Self {
        let start_time = Utc::now();
        let session_id = format!("session_{}", start_time.format("%Y%m%d_%H%M"));
        Self::started(session_id, start_time, paths)
    }

    pub fn with_id(session_id: impl Into<String>, paths: ReflectionPaths) -> Self {
        Self::started(session_id.into(), Utc::now(), paths)
    }

    fn started(session_id: String, start_time: DateTime<Utc>, paths: ReflectionPaths) -> Self {
        debug!(%session_id, "Session tracking started");
        Self {
            session_id,
            start_time,
            error_count: 0,
            consecutive_errors: 0,
            max_consecutive_errors: 0,
            recovery_mode_entered: false,
            features_attempted: BTreeSet::new(),
            features_completed: BTreeSet::new(),
            blocked_features: Vec::new(),
            error_messages: Vec::new(),
            paths,
            evaluator: TriggerEvaluator::default(),
        }
    }

    /// Replace the default trigger set.
    pub fn with_evaluator(mut self, evaluator: TriggerEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Override the start time, e.g. when resuming from a stored timestamp.
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn paths(&self) -> &ReflectionPaths {
        &self.paths
    }

    pub fn record_error(&mut self, message: &str) {
        self.error_count += 1;
        self.consecutive_errors += 1;
        self.max_consecutive_errors = self.max_consecutive_errors.max(self.consecutive_errors);

        let truncated: String = message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect();
        if !self.error_messages.contains(&truncated) {
            self.error_messages.push(truncated);
        }
    }

    /// A successful operation ends the current error streak.
    pub fn record_success(&mut self) {
        self.consecutive_errors = 0;
    }

    pub fn record_recovery_mode(&mut self) {
        self.recovery_mode_entered = true;
    }

    pub fn record_feature_attempt(&mut self, feature: &str) {
        self.features_attempted.insert(feature.to_string());
    }

    pub fn record_feature_complete(&mut self, feature: &str) {
        self.features_completed.insert(feature.to_string());
    }

    pub fn record_blocked_feature(&mut self, feature: &str) {
        if !self.blocked_features.iter().any(|f| f == feature) {
            self.blocked_features.push(feature.to_string());
        }
    }

    /// Build the metrics record as of `end_time` without ending the session.
    pub fn snapshot(&self, end_time: DateTime<Utc>) -> MetricsRecord {
        MetricsRecord {
            session_id: self.session_id.clone(),
            start_time: self.start_time,
            end_time,
            total_errors: self.error_count,
            max_consecutive_errors: self.max_consecutive_errors,
            recovery_mode_entered: self.recovery_mode_entered,
            features_attempted: self.features_attempted.len(),
            features_completed: self.features_completed.len(),
            blocked_features: self.blocked_features.clone(),
            error_patterns: self.error_messages.clone(),
        }
    }

    /// End the session now. See [`finalize_at`](Self::finalize_at).
    pub fn finalize(self) -> Result<ReflectionOutcome, ReflectError> {
        self.finalize_at(Utc::now())
    }

    /// End the session at `end_time`, evaluate the triggers and, if any
    /// fired, append a log entry and merge the session into memory.
    pub fn finalize_at(self, end_time: DateTime<Utc>) -> Result<ReflectionOutcome, ReflectError> {
        let record = self.snapshot(end_time);
        let report = self.evaluator.evaluate(&record);

        if !report.should_reflect() {
            debug!(session_id = %record.session_id, "No reflection triggered");
            return Ok(ReflectionOutcome::Skipped { record });
        }

        // Load first so an unreadable memory fails before the log is touched
        let store = MemoryStore::new(&self.paths.memory_path);
        let memory = store.load()?;

        let log = ReflectionLog::new(&self.paths.log_path);
        let (label, entry) = log.append(&record, &report.fired)?;

        let memory = store.merge_and_save(memory, &record.observation(), &report.fired)?;

        info!(
            session_id = %record.session_id,
            %label,
            triggers = %report.fired.join(", "),
            "Auto-reflection written"
        );

        Ok(ReflectionOutcome::Reflected {
            label: label.to_string(),
            triggers: report.fired,
            entry,
            log_path: self.paths.log_path,
            memory_path: self.paths.memory_path,
            total_sessions: memory.stats.total_sessions,
            keywords_indexed: memory.search_index.len(),
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn tracker() -> SessionTracker {
        SessionTracker::with_id("unit", ReflectionPaths::under(Path::new("/nonexistent")))
    }

    #[test]
    fn test_default_id_from_start_time() {
        let t = SessionTracker::new(ReflectionPaths::under(Path::new("/nonexistent")));
        let expected = format!("session_{}", t.start_time().format("%Y%m%d_%H%M"));
        assert_eq!(t.session_id(), expected);
    }

    #[test]
    fn test_consecutive_streak_and_max() {
        let mut t = tracker();
        t.record_error("a");
        t.record_error("b");
        t.record_success();
        t.record_error("c");
        t.record_error("d");
        t.record_error("e");
        t.record_success();
        t.record_error("f");

        let record = t.snapshot(Utc::now());
        assert_eq!(record.total_errors, 6);
        assert_eq!(record.max_consecutive_errors, 3);
    }

    #[test]
    fn test_success_does_not_reset_total() {
        let mut t = tracker();
        t.record_error("a");
        t.record_success();
        t.record_success();

        let record = t.snapshot(Utc::now());
        assert_eq!(record.total_errors, 1);
        assert_eq!(record.max_consecutive_errors, 1);
    }

    #[test]
    fn test_error_messages_truncated_and_deduplicated() {
        let mut t = tracker();
        let long = "x".repeat(150);
        t.record_error(&long);
        t.record_error(&format!("{}tail", "x".repeat(100)));
        t.record_error("short");
        t.record_error("short");

        let record = t.snapshot(Utc::now());
        assert_eq!(record.total_errors, 4);
        assert_eq!(record.error_patterns, vec!["x".repeat(100), "short".to_string()]);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let mut t = tracker();
        t.record_error(&"é".repeat(120));

        let record = t.snapshot(Utc::now());
        assert_eq!(record.error_patterns[0].chars().count(), 100);
    }

    #[test]
    fn test_features_are_sets_and_blocked_is_ordered() {
        let mut t = tracker();
        t.record_feature_attempt("a");
        t.record_feature_attempt("a");
        t.record_feature_attempt("b");
        // completion without attempt is accepted
        t.record_feature_complete("c");
        t.record_blocked_feature("z");
        t.record_blocked_feature("b");
        t.record_blocked_feature("z");

        let record = t.snapshot(Utc::now());
        assert_eq!(record.features_attempted, 2);
        assert_eq!(record.features_completed, 1);
        assert_eq!(record.blocked_features, vec!["z", "b"]);
    }

    #[test]
    fn test_recovery_mode_is_sticky() {
        let mut t = tracker();
        t.record_recovery_mode();
        t.record_success();
        t.record_recovery_mode();

        assert!(t.snapshot(Utc::now()).recovery_mode_entered);
    }
}

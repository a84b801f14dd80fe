use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TriggerError;
use crate::metrics::MetricsRecord;

/// A named condition over a finished session. One or more firing means the
/// session gets a reflection entry.
pub trait Trigger: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, record: &MetricsRecord) -> Result<bool, TriggerError>;
}

/// Thresholds used by the built-in triggers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriggerThresholds {
    /// `high_errors` fires at this many errors or more
    pub high_errors: usize,
    /// `low_completion` fires below this completed/attempted ratio
    pub low_completion_ratio: f64,
}

impl Default for TriggerThresholds {
    fn default() -> Self {
        Self {
            high_errors: 5,
            low_completion_ratio: 0.5,
        }
    }
}

pub struct HighErrors {
    pub threshold: usize,
}

impl Trigger for HighErrors {
    fn name(&self) -> &str {
        "high_errors"
    }

    fn check(&self, record: &MetricsRecord) -> Result<bool, TriggerError> {
        Ok(record.total_errors >= self.threshold)
    }
}

pub struct RecoveryMode;

impl Trigger for RecoveryMode {
    fn name(&self) -> &str {
        "recovery_mode"
    }

    fn check(&self, record: &MetricsRecord) -> Result<bool, TriggerError> {
        Ok(record.recovery_mode_entered)
    }
}

pub struct BlockedFeatures;

impl Trigger for BlockedFeatures {
    fn name(&self) -> &str {
        "blocked_features"
    }

    fn check(&self, record: &MetricsRecord) -> Result<bool, TriggerError> {
        Ok(!record.blocked_features.is_empty())
    }
}

/// Fires when fewer than `ratio` of the attempted features were completed.
/// A session that attempted nothing does not fire.
pub struct LowCompletion {
    pub ratio: f64,
}

impl Trigger for LowCompletion {
    fn name(&self) -> &str {
        "low_completion"
    }

    fn check(&self, record: &MetricsRecord) -> Result<bool, TriggerError> {
        Ok(record
            .completion_ratio()
            .is_some_and(|completed| completed < self.ratio))
    }
}

/// Names of the triggers that fired, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerReport {
    pub fired: Vec<String>,
}

impl TriggerReport {
    pub fn should_reflect(&self) -> bool {
        !self.fired.is_empty()
    }
}

/// Runs an ordered list of triggers over a session record.
pub struct TriggerEvaluator {
    triggers: Vec<Box<dyn Trigger>>,
}

impl Default for TriggerEvaluator {
    fn default() -> Self {
        Self::new(TriggerThresholds::default())
    }
}

impl TriggerEvaluator {
    /// The built-in triggers: `high_errors`, `recovery_mode`,
    /// `blocked_features`, `low_completion`.
    pub fn new(thresholds: TriggerThresholds) -> Self {
        Self {
            triggers: vec![
                Box::new(HighErrors {
                    threshold: thresholds.high_errors,
                }),
                Box::new(RecoveryMode),
                Box::new(BlockedFeatures),
                Box::new(LowCompletion {
                    ratio: thresholds.low_completion_ratio,
                }),
            ],
        }
    }

    /// Append a trigger, evaluated after the existing ones.
    pub fn with_trigger(mut self, trigger: impl Trigger + 'static) -> Self {
        self.triggers.push(Box::new(trigger));
        self
    }

    pub fn trigger_names(&self) -> Vec<&str> {
        self.triggers.iter().map(|t| t.name()).collect()
    }

    /// Evaluate every trigger. A trigger that fails is skipped and does not
    /// stop the others.
    pub fn evaluate(&self, record: &MetricsRecord) -> TriggerReport {
        let mut fired = Vec::new();

        for trigger in &self.triggers {
            match trigger.check(record) {
                Ok(true) => fired.push(trigger.name().to_string()),
                Ok(false) => {}
                Err(e) => {
                    warn!(trigger = trigger.name(), error = %e, "Skipping trigger");
                }
            }
        }

        debug!(session_id = %record.session_id, ?fired, "Triggers evaluated");
        TriggerReport { fired }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::clean_record;

    struct Broken;

    impl Trigger for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn check(&self, _record: &MetricsRecord) -> Result<bool, TriggerError> {
            Err(TriggerError::Unevaluable {
                trigger: "broken".into(),
                reason: "missing attribute".into(),
            })
        }
    }

    struct Always;

    impl Trigger for Always {
        fn name(&self) -> &str {
            "always"
        }

        fn check(&self, _record: &MetricsRecord) -> Result<bool, TriggerError> {
            Ok(true)
        }
    }

    #[test]
    fn test_clean_session_fires_nothing() {
        let report = TriggerEvaluator::default().evaluate(&clean_record());
        assert!(!report.should_reflect());
        assert!(report.fired.is_empty());
    }

    #[test]
    fn test_high_errors_at_and_above_threshold() {
        let evaluator = TriggerEvaluator::default();
        let mut record = clean_record();

        record.total_errors = 4;
        assert!(!evaluator.evaluate(&record).should_reflect());

        for errors in [5, 6, 50, usize::MAX] {
            record.total_errors = errors;
            assert_eq!(evaluator.evaluate(&record).fired, vec!["high_errors"]);
        }
    }

    #[test]
    fn test_low_completion_ignores_zero_attempts() {
        let evaluator = TriggerEvaluator::default();
        let mut record = clean_record();
        record.features_attempted = 0;

        for completed in [0, 1, 3] {
            record.features_completed = completed;
            let report = evaluator.evaluate(&record);
            assert!(!report.fired.contains(&"low_completion".to_string()));
        }
    }

    #[test]
    fn test_low_completion_boundary() {
        let evaluator = TriggerEvaluator::default();
        let mut record = clean_record();

        record.features_attempted = 2;
        record.features_completed = 1;
        assert!(evaluator.evaluate(&record).fired.is_empty());

        record.features_attempted = 3;
        assert_eq!(evaluator.evaluate(&record).fired, vec!["low_completion"]);
    }

    #[test]
    fn test_all_triggers_in_declared_order() {
        let mut record = clean_record();
        record.total_errors = 7;
        record.recovery_mode_entered = true;
        record.blocked_features = vec!["feature_b".into()];
        record.features_attempted = 4;
        record.features_completed = 1;

        let report = TriggerEvaluator::default().evaluate(&record);
        assert_eq!(
            report.fired,
            vec![
                "high_errors",
                "recovery_mode",
                "blocked_features",
                "low_completion"
            ]
        );
    }

    #[test]
    fn test_failing_trigger_does_not_block_others() {
        let mut record = clean_record();
        record.recovery_mode_entered = true;

        let evaluator = TriggerEvaluator::default()
            .with_trigger(Broken)
            .with_trigger(Always);
        let report = evaluator.evaluate(&record);

        assert_eq!(report.fired, vec!["recovery_mode", "always"]);
    }

    #[test]
    fn test_only_failing_trigger_means_no_reflection() {
        let evaluator = TriggerEvaluator {
            triggers: vec![Box::new(Broken)],
        };
        assert!(!evaluator.evaluate(&clean_record()).should_reflect());
    }

    #[test]
    fn test_custom_thresholds() {
        let evaluator = TriggerEvaluator::new(TriggerThresholds {
            high_errors: 2,
            low_completion_ratio: 0.75,
        });
        let mut record = clean_record();
        record.total_errors = 2;
        record.features_attempted = 3;
        record.features_completed = 2;

        assert_eq!(
            evaluator.evaluate(&record).fired,
            vec!["high_errors", "low_completion"]
        );
    }

    #[test]
    fn test_trigger_names() {
        assert_eq!(
            TriggerEvaluator::default().trigger_names(),
            vec![
                "high_errors",
                "recovery_mode",
                "blocked_features",
                "low_completion"
            ]
        );
    }
}

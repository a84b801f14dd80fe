mod entry;
mod error;
mod journal;
mod metrics;
mod outcome;
mod paths;
mod tracker;
mod trigger;

pub use entry::{format_entry, next_label, SessionLabel, MAX_LISTED_ERRORS};
pub use error::{ReflectError, TriggerError};
pub use journal::{ReflectionLog, LOG_HEADER};
pub use metrics::MetricsRecord;
pub use outcome::ReflectionOutcome;
pub use paths::{ReflectionPaths, DEFAULT_LOG_FILE, DEFAULT_MEMORY_FILE, DEFAULT_REFLECTION_DIR};
pub use tracker::{SessionTracker, MAX_ERROR_MESSAGE_CHARS};
pub use trigger::{
    BlockedFeatures, HighErrors, LowCompletion, RecoveryMode, Trigger, TriggerEvaluator,
    TriggerReport, TriggerThresholds,
};

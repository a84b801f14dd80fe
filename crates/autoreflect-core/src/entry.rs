use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ReflectError;
use crate::metrics::MetricsRecord;

/// At most this many error patterns are listed in an entry.
pub const MAX_LISTED_ERRORS: usize = 5;

lazy_static! {
    static ref SESSION_HEADING: Regex = Regex::new(r"## Session R(\d+)").unwrap();
}

/// Sequence label of a reflection entry, rendered as `R001`, `R002`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionLabel(pub u64);

impl SessionLabel {
    pub const FIRST: SessionLabel = SessionLabel(1);

    /// `None` once the counter cannot grow any further.
    pub fn next(self) -> Option<SessionLabel> {
        self.0.checked_add(1).map(SessionLabel)
    }
}

impl fmt::Display for SessionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{:03}", self.0)
    }
}

/// Label for the next entry: one past the highest label found in the log,
/// or [`SessionLabel::FIRST`] if there is no log or it has no entries.
///
/// A heading whose number does not fit a label is an error rather than
/// being skipped, so an existing label is never handed out twice.
pub fn next_label(log_text: Option<&str>) -> Result<SessionLabel, ReflectError> {
    let Some(text) = log_text else {
        return Ok(SessionLabel::FIRST);
    };

    let mut highest: Option<u64> = None;
    for caps in SESSION_HEADING.captures_iter(text) {
        let digits = &caps[1];
        let n = digits
            .parse::<u64>()
            .map_err(|_| ReflectError::InvalidLabel(digits.to_string()))?;
        highest = highest.max(Some(n));
    }

    match highest {
        None => Ok(SessionLabel::FIRST),
        Some(n) => SessionLabel(n).next().ok_or(ReflectError::LabelsExhausted(n)),
    }
}

/// Render the markdown entry for a reflected session.
pub fn format_entry(record: &MetricsRecord, triggers: &[String], label: SessionLabel) -> String {
    let blocked = if record.blocked_features.is_empty() {
        "None".to_string()
    } else {
        record
            .blocked_features
            .iter()
            .map(|f| format!("- {}", f))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let errors = if record.error_patterns.is_empty() {
        "None".to_string()
    } else {
        record
            .error_patterns
            .iter()
            .take(MAX_LISTED_ERRORS)
            .map(|e| format!("- `{}`", e))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"

## Session {label}: Auto-Generated Reflection

**Date:** {date}
**Type:** Automatic (triggers: {triggers})
**Duration:** {minutes} minutes

### Session Metrics

| Metric | Value |
|--------|-------|
| Total Errors | {total_errors} |
| Max Consecutive Errors | {max_consecutive} |
| Recovery Mode Entered | {recovery} |
| Features Completed | {completed}/{attempted} |

### Blocked Features

{blocked}

### Error Patterns Observed

{errors}

### Notes

*This is an auto-generated reflection. Run `/reflect` for deeper analysis.*

---
"#,
        label = label,
        date = record.end_time.format("%Y-%m-%d %H:%M"),
        triggers = triggers.join(", "),
        minutes = record.duration_minutes(),
        total_errors = record.total_errors,
        max_consecutive = record.max_consecutive_errors,
        recovery = if record.recovery_mode_entered { "Yes" } else { "No" },
        completed = record.features_completed,
        attempted = record.features_attempted,
        blocked = blocked,
        errors = errors,
    )
}

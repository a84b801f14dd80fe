use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

/// Events reported while a session is finalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReflectEvent {
    SessionStarted {
        session_id: String,
    },
    TriggersEvaluated {
        session_id: String,
        fired: Vec<String>,
    },
    ReflectionWritten {
        label: String,
        log_path: PathBuf,
        triggers: Vec<String>,
    },
    MemoryUpdated {
        memory_path: PathBuf,
        total_sessions: u64,
        keywords_indexed: usize,
    },
    ReflectionSkipped {
        session_id: String,
    },
}

impl ReflectEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

/// Reports reflection events on stderr
pub struct Logger {
    format: LogFormat,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }

    pub fn log(&self, event: &ReflectEvent) {
        if let Some(line) = self.render(event) {
            let _ = writeln!(std::io::stderr(), "{}", line);
        }
    }

    /// Render an event in the configured format. Returns `None` for events
    /// the format does not display.
    pub fn render(&self, event: &ReflectEvent) -> Option<String> {
        match self.format {
            LogFormat::Json => Some(event.with_timestamp().to_string()),
            LogFormat::Pretty => Self::render_pretty(event),
            LogFormat::Compact => Some(Self::render_compact(event)),
        }
    }

    fn render_pretty(event: &ReflectEvent) -> Option<String> {
        match event {
            ReflectEvent::SessionStarted { session_id } => Some(format!(
                "{} Tracking session {}",
                "●".bright_blue(),
                session_id.bold()
            )),
            ReflectEvent::TriggersEvaluated { fired, .. } => {
                if fired.is_empty() {
                    // ReflectionSkipped carries the message
                    None
                } else {
                    Some(format!(
                        "{} Auto-reflection triggered ({})",
                        "📝".bright_yellow(),
                        fired.join(", ").bright_yellow()
                    ))
                }
            }
            ReflectEvent::ReflectionWritten {
                label, log_path, ..
            } => Some(format!(
                "   Entry {} added to {}",
                label.bold(),
                log_path.display().to_string().dimmed()
            )),
            ReflectEvent::MemoryUpdated {
                memory_path,
                total_sessions,
                keywords_indexed,
            } => Some(format!(
                "   Memory updated: {} sessions, {} keywords ({})",
                total_sessions,
                keywords_indexed,
                memory_path.display().to_string().dimmed()
            )),
            ReflectEvent::ReflectionSkipped { session_id } => Some(format!(
                "{} No reflection needed for {}",
                "✓".bright_green(),
                session_id
            )),
        }
    }

    fn render_compact(event: &ReflectEvent) -> String {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        match event {
            ReflectEvent::SessionStarted { session_id } => {
                format!("[{}] session:start {}", timestamp, session_id)
            }
            ReflectEvent::TriggersEvaluated { session_id, fired } => format!(
                "[{}] triggers:{} {}",
                timestamp,
                session_id,
                if fired.is_empty() {
                    "-".to_string()
                } else {
                    fired.join(",")
                }
            ),
            ReflectEvent::ReflectionWritten {
                label, log_path, ..
            } => format!(
                "[{}] log:append {} {}",
                timestamp,
                label,
                log_path.display()
            ),
            ReflectEvent::MemoryUpdated {
                total_sessions,
                keywords_indexed,
                ..
            } => format!(
                "[{}] memory:update sessions={} keywords={}",
                timestamp, total_sessions, keywords_indexed
            ),
            ReflectEvent::ReflectionSkipped { session_id } => {
                format!("[{}] reflect:skip {}", timestamp, session_id)
            }
        }
    }
}

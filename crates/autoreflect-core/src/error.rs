use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReflectError {
    #[error("Failed to read reflection log {path:?}: {source}")]
    LogRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write reflection log {path:?}: {source}")]
    LogWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Reflection log has an unreadable session label R{0}")]
    InvalidLabel(String),

    #[error("Reflection log has no session label after R{0}")]
    LabelsExhausted(u64),

    #[error("Memory update failed: {0}")]
    Memory(#[from] autoreflect_memory::MemoryError),
}

/// A trigger that could not decide. The evaluator treats it as not fired.
#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("Trigger '{trigger}' could not be evaluated: {reason}")]
    Unevaluable { trigger: String, reason: String },
}

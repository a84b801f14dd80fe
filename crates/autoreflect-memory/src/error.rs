use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Failed to read memory file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write memory file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file exists but is not a valid memory document. Never recovered
    /// from automatically; the file needs manual repair.
    #[error("Memory file {path:?} is malformed: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize memory: {0}")]
    Serialize(#[from] serde_json::Error),
}

use std::path::{Path, PathBuf};

/// Directory, relative to the project root, holding the log and memory files.
pub const DEFAULT_REFLECTION_DIR: &str = ".github/Reflection";
pub const DEFAULT_LOG_FILE: &str = "reflections.md";
pub const DEFAULT_MEMORY_FILE: &str = "memory.json";

/// Where the reflection log and the memory document live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionPaths {
    pub log_path: PathBuf,
    pub memory_path: PathBuf,
}

impl ReflectionPaths {
    pub fn new(log_path: impl Into<PathBuf>, memory_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            memory_path: memory_path.into(),
        }
    }

    /// Default layout under a project root.
    pub fn under(root: &Path) -> Self {
        Self::in_dir(&root.join(DEFAULT_REFLECTION_DIR))
    }

    /// Default file names inside a given reflection directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DEFAULT_LOG_FILE), dir.join(DEFAULT_MEMORY_FILE))
    }
}

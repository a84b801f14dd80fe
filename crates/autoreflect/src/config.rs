//! Project configuration file support for autoreflect.
//!
//! Loads configuration from `autoreflect.toml` in the working directory.

use anyhow::{Context, Result};
use autoreflect_core::{ReflectionPaths, TriggerThresholds, DEFAULT_REFLECTION_DIR};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Project-level configuration loaded from `autoreflect.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Directory holding the log and memory files, relative to the working directory
    pub reflection_dir: Option<PathBuf>,
    /// Reflection log file name, relative to `reflection_dir`
    pub log_file: Option<PathBuf>,
    /// Memory file name, relative to `reflection_dir`
    pub memory_file: Option<PathBuf>,
    /// Trigger thresholds
    #[serde(default)]
    pub triggers: TriggerThresholds,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "autoreflect.toml";

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Resolve the log and memory paths against the working directory.
    pub fn paths(&self, working_dir: &Path) -> ReflectionPaths {
        let dir = working_dir.join(
            self.reflection_dir
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_REFLECTION_DIR)),
        );
        let defaults = ReflectionPaths::in_dir(&dir);

        ReflectionPaths {
            log_path: self
                .log_file
                .as_ref()
                .map(|f| dir.join(f))
                .unwrap_or(defaults.log_path),
            memory_path: self
                .memory_file
                .as_ref()
                .map(|f| dir.join(f))
                .unwrap_or(defaults.memory_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(ProjectConfig::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_default_paths() {
        let config = ProjectConfig::default();
        let paths = config.paths(Path::new("/repo"));
        assert_eq!(paths, ReflectionPaths::under(Path::new("/repo")));
        assert_eq!(config.triggers, TriggerThresholds::default());
    }

    #[test]
    fn test_full_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
reflection_dir = "notes/reflect"
log_file = "log.md"
memory_file = "stats.json"

[triggers]
high_errors = 3
low_completion_ratio = 0.8
"#,
        )
        .unwrap();

        let config = ProjectConfig::load(dir.path()).unwrap().unwrap();
        let paths = config.paths(dir.path());

        assert_eq!(paths.log_path, dir.path().join("notes/reflect/log.md"));
        assert_eq!(paths.memory_path, dir.path().join("notes/reflect/stats.json"));
        assert_eq!(config.triggers.high_errors, 3);
        assert!((config.triggers.low_completion_ratio - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_triggers_keep_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[triggers]\nhigh_errors = 10\n",
        )
        .unwrap();

        let config = ProjectConfig::load(dir.path()).unwrap().unwrap();
        assert_eq!(config.triggers.high_errors, 10);
        assert_eq!(config.triggers.low_completion_ratio, 0.5);
    }

    #[test]
    fn test_unknown_key_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "log_dir = \"x\"\n").unwrap();

        assert!(ProjectConfig::load(dir.path()).is_err());
    }
}

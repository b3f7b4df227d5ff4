//! # Configuration
//!
//! Loads [`Config`] from a TOML file, environment overrides, and defaults.
//!
//! ## Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `CURRICULA_CONFIG` environment variable
//! 3. `./curricula.toml`, when present
//! 4. Built-in defaults
//!
//! `CURRICULA_DATA_DIR` and `CURRICULA_GRADE` are applied last and win over
//! the file.

use curricula_core::primitives::{DEFAULT_GRADE, DEFAULT_WINDOW_SIZE, MAX_WINDOW_SIZE};
use curricula_core::{CurriculumError, DirectorySource, Grade};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "CURRICULA_CONFIG";
/// Environment override for [`Config::data_dir`].
pub const DATA_DIR_ENV: &str = "CURRICULA_DATA_DIR";
/// Environment override for [`Config::default_grade`].
pub const GRADE_ENV: &str = "CURRICULA_GRADE";
/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "curricula.toml";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding `<subject>.json` taxonomy documents.
    pub data_dir: PathBuf,

    /// Subjects to load; empty means the built-in list.
    pub subjects: Vec<String>,

    /// Grade used when a command gets no `--grade`.
    pub default_grade: Grade,

    /// Nodes shown by `map` when no `--limit` is given.
    pub window_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            subjects: Vec::new(),
            default_grade: DEFAULT_GRADE,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CurriculumError> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// Load with an injectable environment lookup.
    pub fn load_with<F>(explicit: Option<&Path>, env: F) -> Result<Self, CurriculumError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match Self::resolve_config_path(explicit, &env) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env(&env)?;
        config.normalize();
        Ok(config)
    }

    /// Resolve the config file from the flag, the env var, or the working directory.
    ///
    /// Only the working-directory default is optional; an explicit path that
    /// does not exist surfaces as an error when read.
    pub fn resolve_config_path<F>(explicit: Option<&Path>, env: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = env(CONFIG_ENV).filter(|p| !p.trim().is_empty()) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.is_file().then_some(local)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self, CurriculumError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CurriculumError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, CurriculumError> {
        toml::from_str(content).map_err(|e| CurriculumError::Config(e.to_string()))
    }

    /// Taxonomy source for this configuration.
    pub fn source(&self) -> DirectorySource {
        let source = DirectorySource::new(&self.data_dir);
        if self.subjects.is_empty() {
            source
        } else {
            source.with_subjects(self.subjects.iter().cloned())
        }
    }

    fn apply_env<F>(&mut self, env: &F) -> Result<(), CurriculumError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = env(DATA_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = env(GRADE_ENV).filter(|g| !g.trim().is_empty()) {
            self.default_grade = raw.parse().map_err(|_| {
                CurriculumError::Config(format!("{GRADE_ENV}: invalid grade '{raw}'"))
            })?;
        }
        Ok(())
    }

    fn normalize(&mut self) {
        let clamped = self.window_size.clamp(1, MAX_WINDOW_SIZE);
        if clamped != self.window_size {
            tracing::warn!(
                requested = self.window_size,
                used = clamped,
                "window_size out of range; clamped"
            );
            self.window_size = clamped;
        }
        self.subjects.retain(|s| !s.trim().is_empty());
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.default_grade, Grade(0));
        assert_eq!(config.window_size, DEFAULT_WINDOW_SIZE);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml("default_grade = 4\n").expect("parse");
        assert_eq!(config.default_grade, Grade(4));
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_toml("colour = \"blue\"\n"),
            Err(CurriculumError::Config(_))
        ));
    }

    #[test]
    fn env_overrides_win() {
        let env = |key: &str| match key {
            DATA_DIR_ENV => Some("/srv/taxonomies".to_string()),
            GRADE_ENV => Some("middle".to_string()),
            _ => None,
        };
        let mut config = Config::default();
        config.apply_env(&env).expect("env");
        assert_eq!(config.data_dir, PathBuf::from("/srv/taxonomies"));
        assert_eq!(config.default_grade, Grade(6));
    }

    #[test]
    fn bad_grade_env_is_a_config_error() {
        let env = |key: &str| (key == GRADE_ENV).then(|| "sophomore-ish".to_string());
        let mut config = Config::default();
        assert!(matches!(
            config.apply_env(&env),
            Err(CurriculumError::Config(_))
        ));
    }

    #[test]
    fn window_size_is_clamped() {
        let mut config = Config::from_toml("window_size = 0\n").expect("parse");
        config.normalize();
        assert_eq!(config.window_size, 1);
    }

    #[test]
    fn explicit_path_beats_env() {
        let env = |key: &str| (key == CONFIG_ENV).then(|| "/from/env.toml".to_string());
        let explicit = Path::new("/from/flag.toml");
        assert_eq!(
            Config::resolve_config_path(Some(explicit), &env),
            Some(explicit.to_path_buf())
        );
        assert_eq!(
            Config::resolve_config_path(None, &env),
            Some(PathBuf::from("/from/env.toml"))
        );
    }
}

//! Process-level configuration.

use std::path::PathBuf;

use crate::store::DEFAULT_LABELS_DIR;
use crate::whitelist::DEFAULT_WHITELIST_PATH;

/// Environment variable overriding the whitelist path.
pub const WHITELIST_PATH_ENV: &str = "DOCTOR_WHITELIST_PATH";
/// Environment variable overriding the labels directory.
pub const LABELS_DIR_ENV: &str = "DOCTOR_LABELS_DIR";

/// Where the whitelist and label documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelingConfig {
    pub whitelist_path: PathBuf,
    pub labels_dir: PathBuf,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            whitelist_path: PathBuf::from(DEFAULT_WHITELIST_PATH),
            labels_dir: PathBuf::from(DEFAULT_LABELS_DIR),
        }
    }
}

impl LabelingConfig {
    /// Defaults, overridden by `DOCTOR_WHITELIST_PATH` / `DOCTOR_LABELS_DIR`
    /// when set and non-empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(WHITELIST_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            config.whitelist_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(LABELS_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            config.labels_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_whitelist_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.whitelist_path = path.into();
        self
    }

    pub fn with_labels_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.labels_dir = dir.into();
        self
    }
}

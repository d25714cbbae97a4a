//! TOML configuration file
//!
//! ```toml
//! migration = "Migrations/20240101000000_Seed.cs"
//! seed_dir = "Seeds"
//! seed_snapshot_dir = "Snapshots/Seeds"
//! seed_map = "seedmap.json"
//! sqlobjects_dir = "SqlObjects"
//! sqlobjects_snapshot_dir = "Snapshots/SqlObjects"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use seedsync_core::{SyncError, SyncResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Paths read from a `--config` file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub migration: Option<PathBuf>,
    pub seed_dir: Option<PathBuf>,
    pub seed_snapshot_dir: Option<PathBuf>,
    pub seed_map: Option<PathBuf>,
    pub sqlobjects_dir: Option<PathBuf>,
    pub sqlobjects_snapshot_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Read and parse `path`, resolving relative entries against its directory
    pub fn load(path: &Path) -> SyncResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SyncError::read(path, e))?;
        let config = Self::from_toml_str(&text)
            .map_err(|e| SyncError::InvalidConfig(format!("{}: {e}", path.display())))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        tracing::debug!(path = %path.display(), "config file loaded");
        Ok(config.relative_to(base))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Join every relative path onto `base`
    pub fn relative_to(self, base: &Path) -> Self {
        let resolve = |p: Option<PathBuf>| {
            p.map(|p| if p.is_relative() { base.join(p) } else { p })
        };
        Self {
            migration: resolve(self.migration),
            seed_dir: resolve(self.seed_dir),
            seed_snapshot_dir: resolve(self.seed_snapshot_dir),
            seed_map: resolve(self.seed_map),
            sqlobjects_dir: resolve(self.sqlobjects_dir),
            sqlobjects_snapshot_dir: resolve(self.sqlobjects_snapshot_dir),
        }
    }
}

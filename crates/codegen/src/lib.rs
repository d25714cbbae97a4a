//! # Seedsync Codegen
//!
//! Migration generation engine for Seedsync.
//!
//! This crate diffs the current seed data and SQL object definitions against
//! the snapshots left by the previous run, renders the SQL needed to bring a
//! database from the old state to the new one, and patches that SQL into the
//! generated regions of a migration file.
//!
//! ## Features
//!
//! - **Seed Diffing**: batched upserts and deletes per seeded entity
//! - **SQL Object Diffing**: create-or-replace bodies and recorded drops for
//!   functions and procedures
//! - **Migration Patching**: idempotent rewrite of the two generated regions
//! - **Snapshots**: staged, written only after the migration is patched
//!

// ============================================================================
// Modules
// ============================================================================

pub mod generator;
pub mod migration;
pub mod seed;
pub mod sql;
pub mod sql_objects;

// ============================================================================
// Re-exports
// ============================================================================

pub use generator::{GenerationPlan, GenerationSummary, Generator};
pub use seed::{EntityReport, SeedDiff, SeedOutput, generate_seed_sql};
pub use sql_objects::{ObjectDiff, ObjectOutput, generate_object_sql};

use seedsync_core::{SyncError, SyncResult, Validatable};
use std::path::{Path, PathBuf};

// ============================================================================
// GeneratorConfig
// ============================================================================

/// Input and output locations for one generator run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Migration file whose `Up` method receives the generated regions
    pub migration_path: PathBuf,

    /// Directory of `<Entity>.json` seed files
    pub seed_dir: PathBuf,

    /// Directory of `<Entity>.snapshot.json` files
    pub seed_snapshot_dir: PathBuf,

    /// JSON file mapping entity names to schema/table
    pub seed_map_path: PathBuf,

    /// Directory holding `Functions/` and `Procedures/`
    pub sql_objects_dir: PathBuf,

    /// Directory holding the SQL object snapshots
    pub sql_objects_snapshot_dir: PathBuf,

    /// Compute and report without writing anything
    pub dry_run: bool,
}

impl GeneratorConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_migration(mut self, path: impl Into<PathBuf>) -> Self {
        self.migration_path = path.into();
        self
    }

    pub fn with_seed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.seed_dir = dir.into();
        self
    }

    pub fn with_seed_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.seed_snapshot_dir = dir.into();
        self
    }

    pub fn with_seed_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_map_path = path.into();
        self
    }

    pub fn with_sql_objects_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sql_objects_dir = dir.into();
        self
    }

    pub fn with_sql_objects_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sql_objects_snapshot_dir = dir.into();
        self
    }

    /// Only report what would change
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }
}

fn require_file(what: &str, path: &Path) -> SyncResult<()> {
    if path.as_os_str().is_empty() {
        return Err(SyncError::MissingArgument(what.to_string()));
    }
    if !path.is_file() {
        return Err(SyncError::not_found(what, path));
    }
    Ok(())
}

fn require_dir(what: &str, path: &Path) -> SyncResult<()> {
    if path.as_os_str().is_empty() {
        return Err(SyncError::MissingArgument(what.to_string()));
    }
    if !path.is_dir() {
        return Err(SyncError::not_found(what, path));
    }
    Ok(())
}

impl Validatable for GeneratorConfig {
    /// Inputs must exist. Snapshot directories only need to be named; they
    /// are created on first commit.
    fn validate(&self) -> SyncResult<()> {
        require_file("migration", &self.migration_path)?;
        require_dir("seed-dir", &self.seed_dir)?;
        require_file("seed-map", &self.seed_map_path)?;
        require_dir("sqlobjects-dir", &self.sql_objects_dir)?;

        if self.seed_snapshot_dir.as_os_str().is_empty() {
            return Err(SyncError::MissingArgument("seed-snapshot-dir".into()));
        }
        if self.sql_objects_snapshot_dir.as_os_str().is_empty() {
            return Err(SyncError::MissingArgument("sqlobjects-snapshot-dir".into()));
        }
        Ok(())
    }
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Tests
// ============================================================================

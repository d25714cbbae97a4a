//! Snapshot store
//!
//! Snapshots are the normalized state produced by the previous successful
//! run. They are read once at the start of a run (a missing snapshot means
//! "empty") and rewritten once at the end to mirror the current sources
//! exactly. They are never merged or appended.
//!
//! ## Layout
//!
//! ```text
//! <seed snapshot dir>/<Entity>.snapshot.json
//! <objects snapshot dir>/Functions/<schema>.<name>.snapshot.sql
//! <objects snapshot dir>/Procedures/<schema>.<name>.snapshot.sql
//! ```

use seedsync_core::{SqlObjectType, SyncError, SyncResult};
use std::path::{Path, PathBuf};

/// File suffix of seed snapshots
pub const SEED_SNAPSHOT_SUFFIX: &str = ".snapshot.json";

/// File suffix of SQL object snapshots
pub const OBJECT_SNAPSHOT_SUFFIX: &str = ".snapshot.sql";

/// Snapshot path for a seeded entity
pub fn seed_snapshot_path(snapshot_dir: impl AsRef<Path>, entity: &str) -> PathBuf {
    snapshot_dir
        .as_ref()
        .join(format!("{entity}{SEED_SNAPSHOT_SUFFIX}"))
}

/// Snapshot path for a SQL object
pub fn object_snapshot_path(
    snapshot_dir: impl AsRef<Path>,
    object_type: SqlObjectType,
    schema: &str,
    name: &str,
) -> PathBuf {
    snapshot_dir
        .as_ref()
        .join(object_type.folder_name())
        .join(format!("{schema}.{name}{OBJECT_SNAPSHOT_SUFFIX}"))
}

// ============================================================================
// Pending Writes
// ============================================================================

/// A snapshot body waiting to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotWrite {
    pub path: PathBuf,
    pub content: String,
}

impl SnapshotWrite {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Snapshot changes collected during a run and applied only after the run
/// has fully succeeded.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBatch {
    writes: Vec<SnapshotWrite>,
    removals: Vec<PathBuf>,
}

impl SnapshotBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a full snapshot body for `path`
    pub fn write(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.writes.push(SnapshotWrite::new(path, content));
    }

    /// Queue removal of a snapshot whose source no longer exists
    pub fn remove(&mut self, path: impl Into<PathBuf>) {
        self.removals.push(path.into());
    }

    /// Append everything queued in `other`
    pub fn extend(&mut self, other: SnapshotBatch) {
        self.writes.extend(other.writes);
        self.removals.extend(other.removals);
    }

    pub fn writes(&self) -> &[SnapshotWrite] {
        &self.writes
    }

    pub fn removals(&self) -> &[PathBuf] {
        &self.removals
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.removals.is_empty()
    }

    /// Remove stale snapshots, then write every queued snapshot, creating
    /// parent directories.
    ///
    /// A stale path may name the same file as a new one on a case-insensitive
    /// file system, so removals run first.
    pub fn commit(&self) -> SyncResult<()> {
        for path in &self.removals {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(SyncError::FileRemove {
                        path: path.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        for write in &self.writes {
            if let Some(parent) = write.path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| SyncError::DirectoryCreate {
                    path: parent.to_path_buf(),
                    message: e.to_string(),
                })?;
            }
            std::fs::write(&write.path, &write.content).map_err(|e| SyncError::FileWrite {
                path: write.path.clone(),
                message: e.to_string(),
            })?;
        }

        tracing::debug!(
            written = self.writes.len(),
            removed = self.removals.len(),
            "snapshots committed",
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

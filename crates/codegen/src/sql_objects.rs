//! # SQL Object Diff Engine
//!
//! Compares current function/procedure definitions with their snapshots.
//!
//! - new or changed object → its full normalized body (a create-or-replace script)
//! - object with no current file → the DROP statement recorded in its snapshot
//! - unchanged object → nothing
//!
//! Statements are ordered by object key: bodies first, then drops.

use crate::sql::ensure_semicolon;
use seedsync_core::SyncResult;
use seedsync_ir::{SnapshotBatch, SqlObjectInfo, SqlObjectSet, load_objects, load_snapshots};
use std::path::Path;

/// How a current object relates to its snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectChange {
    Created,
    Replaced,
    Unchanged,
}

/// Object-level classification
#[derive(Debug, Clone, Default)]
pub struct ObjectDiff<'a> {
    pub created: Vec<&'a SqlObjectInfo>,
    pub replaced: Vec<&'a SqlObjectInfo>,
    pub unchanged: Vec<&'a SqlObjectInfo>,
    pub dropped: Vec<&'a SqlObjectInfo>,
}

impl<'a> ObjectDiff<'a> {
    /// Classify `current` against `snapshots`
    pub fn between(current: &'a SqlObjectSet, snapshots: &'a SqlObjectSet) -> Self {
        let mut diff = ObjectDiff::default();

        for object in current.values() {
            match classify(object, snapshots.get(&object.key)) {
                ObjectChange::Created => diff.created.push(object),
                ObjectChange::Replaced => diff.replaced.push(object),
                ObjectChange::Unchanged => diff.unchanged.push(object),
            }
        }

        diff.dropped = snapshots
            .values()
            .filter(|snapshot| !current.contains_key(&snapshot.key))
            .collect();

        diff
    }

    /// Statements in key order: bodies of new/changed objects, then drops
    pub fn statements(&self) -> Vec<String> {
        let mut changed: Vec<&SqlObjectInfo> =
            self.created.iter().chain(&self.replaced).copied().collect();
        changed.sort_by(|a, b| a.key.cmp(&b.key));

        changed
            .iter()
            .map(|object| ensure_semicolon(&object.normalized_content))
            .chain(
                self.dropped
                    .iter()
                    .map(|object| ensure_semicolon(&object.drop_statement)),
            )
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.replaced.is_empty() && self.dropped.is_empty()
    }
}

fn classify(current: &SqlObjectInfo, prior: Option<&SqlObjectInfo>) -> ObjectChange {
    match prior {
        None => ObjectChange::Created,
        Some(prior) if prior.normalized_content != current.normalized_content => {
            ObjectChange::Replaced
        }
        Some(_) => ObjectChange::Unchanged,
    }
}

/// Everything the SQL object engine produced for one run
#[derive(Debug, Clone, Default)]
pub struct ObjectOutput {
    pub statements: Vec<String>,
    pub snapshots: SnapshotBatch,
    pub created: usize,
    pub replaced: usize,
    pub unchanged: usize,
    pub dropped: usize,
}

/// Diff the `Functions/` and `Procedures/` folders against their snapshots.
///
/// Every current object gets a snapshot write, changed or not. Snapshots of
/// dropped objects, and snapshots stored under a path that no longer matches
/// their object, are queued for removal.
pub fn generate_object_sql(objects_dir: &Path, snapshot_dir: &Path) -> SyncResult<ObjectOutput> {
    let current = load_objects(objects_dir, snapshot_dir)?;
    let snapshots = load_snapshots(snapshot_dir)?;
    let diff = ObjectDiff::between(&current, &snapshots);

    let mut output = ObjectOutput {
        statements: diff.statements(),
        created: diff.created.len(),
        replaced: diff.replaced.len(),
        unchanged: diff.unchanged.len(),
        dropped: diff.dropped.len(),
        ..ObjectOutput::default()
    };

    for object in current.values() {
        if let Some(prior) = snapshots.get(&object.key)
            && prior.snapshot_path != object.snapshot_path
        {
            output.snapshots.remove(&prior.snapshot_path);
        }
        output
            .snapshots
            .write(&object.snapshot_path, &object.normalized_content);
    }
    for object in &diff.dropped {
        tracing::debug!(key = %object.key, "sql object dropped");
        output.snapshots.remove(&object.snapshot_path);
    }

    tracing::debug!(
        created = output.created,
        replaced = output.replaced,
        unchanged = output.unchanged,
        dropped = output.dropped,
        "sql objects diffed",
    );
    Ok(output)
}

// ============================================================================
// Tests
// ============================================================================

//! # Seed Diff Engine
//!
//! Compares each entity's current seed file against its snapshot and emits
//! the statements that move the table from the snapshot state to the
//! current one.
//!
//! ## Pipeline (per entity, in file-name order)
//!
//! ```text
//! <Entity>.json ──► SeedDataset ─┐
//!                                ├──► SeedDiff { added, updated, deleted }
//! <Entity>.snapshot.json ────────┘          │
//!                                           ├──► INSERT … ON CONFLICT (per column signature, 200 rows/batch)
//!                                           └──► DELETE … WHERE "Id" IN (…) (200 ids/batch)
//! ```
//!
//! Added and updated rows are both applied through the same upsert; they are
//! classified separately only for reporting.

use crate::sql::{literal, qualified_table, quote_ident};
use seedsync_core::{SyncResult, TableRef};
use seedsync_ir::fs::{file_name, list_files, strip_suffix_ignore_case};
use seedsync_ir::seed::SEED_EXTENSION;
use seedsync_ir::snapshot::SEED_SNAPSHOT_SUFFIX;
use seedsync_ir::{ID_FIELD, SeedDataset, SeedItem, SeedMap, SnapshotBatch, seed_snapshot_path};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Maximum rows per generated statement
pub const BATCH_SIZE: usize = 200;

/// Columns never written by the generator (compared case-insensitively)
pub const EXCLUDED_COLUMNS: &[&str] = &["RowVersion"];

// ============================================================================
// SeedDiff
// ============================================================================

/// Row-level classification of one entity
#[derive(Debug, Clone, Default)]
pub struct SeedDiff<'a> {
    /// In current, not in snapshot (ascending id)
    pub added: Vec<&'a SeedItem>,
    /// In both, canonical text differs (ascending id)
    pub updated: Vec<&'a SeedItem>,
    /// In snapshot, not in current (ascending id)
    pub deleted: Vec<&'a SeedItem>,
}

impl<'a> SeedDiff<'a> {
    /// Classify `current` against `snapshot`
    pub fn between(current: &'a SeedDataset, snapshot: &'a SeedDataset) -> Self {
        let mut diff = SeedDiff::default();

        for item in current.items() {
            match snapshot.get(&item.id) {
                None => diff.added.push(item),
                Some(prior) if prior.differs_from(item) => diff.updated.push(item),
                Some(_) => {}
            }
        }

        diff.deleted = snapshot
            .items()
            .filter(|item| !current.contains(&item.id))
            .collect();

        diff
    }

    /// Rows to upsert: added and updated merged, ascending id
    pub fn upserts(&self) -> Vec<&'a SeedItem> {
        let mut rows: Vec<&'a SeedItem> = self.added.iter().chain(&self.updated).copied().collect();
        rows.sort_by_key(|item| item.id);
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

// ============================================================================
// Statement Builders
// ============================================================================

/// Sorted non-identifier, non-excluded field names of a row.
///
/// Rows with different signatures need different INSERT column lists.
pub fn column_signature(item: &SeedItem) -> Vec<String> {
    let mut columns: Vec<String> = item
        .field_names()
        .filter(|name| !name.eq_ignore_ascii_case(ID_FIELD))
        .filter(|name| !EXCLUDED_COLUMNS.iter().any(|x| x.eq_ignore_ascii_case(name)))
        .map(str::to_string)
        .collect();
    columns.sort();
    columns
}

/// All statements for one entity: upserts grouped by signature, then deletes.
pub fn build_seed_statements(table: &TableRef, diff: &SeedDiff<'_>) -> Vec<String> {
    let mut statements = Vec::new();

    let mut groups: BTreeMap<Vec<String>, Vec<&SeedItem>> = BTreeMap::new();
    for item in diff.upserts() {
        groups.entry(column_signature(item)).or_default().push(item);
    }
    for (columns, rows) in &groups {
        for chunk in rows.chunks(BATCH_SIZE) {
            statements.push(upsert_statement(table, columns, chunk));
        }
    }

    for chunk in diff.deleted.chunks(BATCH_SIZE) {
        statements.push(delete_statement(table, chunk));
    }

    statements
}

/// `INSERT … ON CONFLICT ("Id") DO UPDATE SET …` for one batch
pub fn upsert_statement(table: &TableRef, columns: &[String], rows: &[&SeedItem]) -> String {
    let mut all_columns: Vec<&str> = vec![ID_FIELD];
    all_columns.extend(columns.iter().map(String::as_str));

    let column_list = all_columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    let values = rows
        .iter()
        .map(|row| {
            let cells = all_columns
                .iter()
                .map(|c| row.get(c).map(literal).unwrap_or_else(|| "NULL".to_string()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({cells})")
        })
        .collect::<Vec<_>>()
        .join(", ");

    let action = if columns.is_empty() {
        "DO NOTHING".to_string()
    } else {
        let updates = columns
            .iter()
            .map(|c| format!("{0} = EXCLUDED.{0}", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("DO UPDATE SET {updates}")
    };

    format!(
        "INSERT INTO {} ({column_list}) VALUES {values} ON CONFLICT ({}) {action};",
        qualified_table(table),
        quote_ident(ID_FIELD),
    )
}

/// `DELETE FROM … WHERE "Id" IN (…)` for one batch
pub fn delete_statement(table: &TableRef, rows: &[&SeedItem]) -> String {
    let ids = rows
        .iter()
        .map(|row| format!("'{}'", row.id.hyphenated()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "DELETE FROM {} WHERE {} IN ({ids});",
        qualified_table(table),
        quote_ident(ID_FIELD),
    )
}

// ============================================================================
// Directory-level generation
// ============================================================================

/// Per-entity outcome, used for the run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReport {
    pub entity: String,
    pub table: TableRef,
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    pub statements: usize,
}

/// Everything the seed engine produced for one run
#[derive(Debug, Clone, Default)]
pub struct SeedOutput {
    pub statements: Vec<String>,
    pub snapshots: SnapshotBatch,
    pub entities: Vec<EntityReport>,
}

/// Diff every seed file in `seed_dir` against its snapshot.
///
/// A snapshot write is queued for every processed entity, changed or not,
/// holding the full normalized current dataset.
pub fn generate_seed_sql(
    seed_dir: &Path,
    snapshot_dir: &Path,
    seed_map: &SeedMap,
) -> SyncResult<SeedOutput> {
    let mut output = SeedOutput::default();
    let mut seen = BTreeSet::new();

    for path in list_files(seed_dir, SEED_EXTENSION)? {
        let name = file_name(&path);
        let entity = strip_suffix_ignore_case(&name, SEED_EXTENSION).unwrap_or(name.as_str());
        let table = seed_map.require(entity)?;

        let current = SeedDataset::load(&path)?;
        let snapshot = SeedDataset::load_snapshot(snapshot_dir, entity)?;
        let diff = SeedDiff::between(&current, &snapshot);
        let statements = build_seed_statements(table, &diff);

        tracing::debug!(
            entity,
            table = %table,
            added = diff.added.len(),
            updated = diff.updated.len(),
            deleted = diff.deleted.len(),
            statements = statements.len(),
            "seed entity diffed",
        );

        output.entities.push(EntityReport {
            entity: entity.to_string(),
            table: table.clone(),
            added: diff.added.len(),
            updated: diff.updated.len(),
            deleted: diff.deleted.len(),
            statements: statements.len(),
        });
        output.statements.extend(statements);
        output.snapshots.write(
            seed_snapshot_path(snapshot_dir, entity),
            current.normalized_array(),
        );
        seen.insert(entity.to_string());
    }

    warn_orphans(snapshot_dir, seed_map, &seen)?;
    Ok(output)
}

fn warn_orphans(snapshot_dir: &Path, seed_map: &SeedMap, seen: &BTreeSet<String>) -> SyncResult<()> {
    for entity in seed_map.entities().filter(|e| !seen.contains(*e)) {
        tracing::debug!(entity, "seed map entry has no seed file");
    }

    for path in list_files(snapshot_dir, SEED_SNAPSHOT_SUFFIX)? {
        let name = file_name(&path);
        let entity = strip_suffix_ignore_case(&name, SEED_SNAPSHOT_SUFFIX).unwrap_or(name.as_str());
        if !seen.contains(entity) {
            tracing::warn!(
                entity,
                path = %path.display(),
                "seed snapshot has no seed file; its rows are left untouched",
            );
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

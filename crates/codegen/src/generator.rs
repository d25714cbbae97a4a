//! # Migration Generator Orchestrator
//!
//! The `Generator` is the top-level entry point. It takes a
//! [`GeneratorConfig`], runs both diff engines, patches the migration text in
//! memory and hands back a [`GenerationPlan`]. Nothing touches the disk until
//! the plan is committed.
//!
//! ## Pipeline
//!
//! ```text
//! GeneratorConfig
//!         │
//!         ▼
//!   validate() + SeedMap::load()
//!         │
//!         ├──► seed::generate_seed_sql()          → SeedOutput
//!         ├──► sql_objects::generate_object_sql() → ObjectOutput
//!         │
//!         ▼
//!   migration::apply()                            → patched text
//!         │
//!         ▼
//!   GenerationPlan ──commit()──► migration file, then snapshots
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use seedsync_codegen::{Generator, GeneratorConfig};
//!
//! let config = GeneratorConfig::new()
//!     .with_migration("Migrations/20240101_Seed.cs")
//!     .with_seed_dir("Seeds")
//!     .with_seed_snapshot_dir("Snapshots/Seeds")
//!     .with_seed_map("seedmap.json")
//!     .with_sql_objects_dir("SqlObjects")
//!     .with_sql_objects_snapshot_dir("Snapshots/SqlObjects");
//!
//! let summary = Generator::new(config).run()?;
//! println!("{summary}");
//! ```

use seedsync_core::{SyncError, SyncResult, Validatable};
use seedsync_ir::{SeedMap, SnapshotBatch};
use std::path::{Path, PathBuf};

use crate::GeneratorConfig;
use crate::migration;
use crate::seed::{SeedOutput, generate_seed_sql};
use crate::sql_objects::{ObjectOutput, generate_object_sql};

const BOM: char = '\u{feff}';

// ============================================================================
// Generator
// ============================================================================

/// Top-level generator that orchestrates one run.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a new generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Compute everything a run would do without writing anything.
    ///
    /// # Errors
    ///
    /// Any invalid input aborts the whole run: missing paths, a malformed
    /// seed map, seed file or SQL object header, a seed file without a map
    /// entry, or malformed region markers in the migration.
    pub fn plan(&self) -> SyncResult<GenerationPlan> {
        self.config.validate()?;

        let seed_map = SeedMap::load(&self.config.seed_map_path)?;
        let seed = generate_seed_sql(
            &self.config.seed_dir,
            &self.config.seed_snapshot_dir,
            &seed_map,
        )?;
        let objects = generate_object_sql(
            &self.config.sql_objects_dir,
            &self.config.sql_objects_snapshot_dir,
        )?;

        let path = &self.config.migration_path;
        let raw = std::fs::read_to_string(path).map_err(|e| SyncError::read(path, e))?;
        let (had_bom, original) = match raw.strip_prefix(BOM) {
            Some(rest) => (true, rest.to_string()),
            None => (false, raw),
        };
        let patched = migration::apply(&original, &seed.statements, &objects.statements)?;

        Ok(GenerationPlan {
            migration_path: path.clone(),
            original,
            patched,
            had_bom,
            seed,
            objects,
        })
    }

    /// Plan and, unless this is a dry run, commit.
    pub fn run(&self) -> SyncResult<GenerationSummary> {
        let plan = self.plan()?;
        let mut summary = plan.summary();
        summary.dry_run = self.config.dry_run;

        if self.config.dry_run {
            tracing::info!(
                migration = %plan.migration_path.display(),
                "dry run: no files written",
            );
        } else {
            plan.commit()?;
        }

        tracing::info!(
            seed_statements = summary.seed_statements,
            object_statements = summary.object_statements,
            migration_changed = summary.migration_changed,
            "generation complete",
        );
        Ok(summary)
    }
}

// ============================================================================
// GenerationPlan
// ============================================================================

/// The outcome of a run, held in memory until [`commit`](Self::commit).
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    migration_path: PathBuf,
    original: String,
    patched: String,
    had_bom: bool,
    pub seed: SeedOutput,
    pub objects: ObjectOutput,
}

impl GenerationPlan {
    pub fn migration_path(&self) -> &Path {
        &self.migration_path
    }

    /// New migration text, without any byte order mark
    pub fn patched(&self) -> &str {
        &self.patched
    }

    pub fn migration_changed(&self) -> bool {
        self.original != self.patched
    }

    /// Snapshot writes and removals of both engines
    pub fn snapshots(&self) -> SnapshotBatch {
        let mut batch = self.seed.snapshots.clone();
        batch.extend(self.objects.snapshots.clone());
        batch
    }

    pub fn summary(&self) -> GenerationSummary {
        let snapshots = self.snapshots();
        GenerationSummary {
            entities: self.seed.entities.len(),
            rows_added: self.seed.entities.iter().map(|e| e.added).sum(),
            rows_updated: self.seed.entities.iter().map(|e| e.updated).sum(),
            rows_deleted: self.seed.entities.iter().map(|e| e.deleted).sum(),
            seed_statements: self.seed.statements.len(),
            objects_created: self.objects.created,
            objects_replaced: self.objects.replaced,
            objects_unchanged: self.objects.unchanged,
            objects_dropped: self.objects.dropped,
            object_statements: self.objects.statements.len(),
            migration_changed: self.migration_changed(),
            snapshots_written: snapshots.writes().len(),
            snapshots_removed: snapshots.removals().len(),
            dry_run: false,
        }
    }

    /// Write the migration if its text changed, then the snapshots.
    ///
    /// Snapshots are only advanced once the migration holds the statements
    /// derived from them.
    pub fn commit(&self) -> SyncResult<()> {
        if self.migration_changed() {
            let mut content = String::with_capacity(self.patched.len() + BOM.len_utf8());
            if self.had_bom {
                content.push(BOM);
            }
            content.push_str(&self.patched);
            std::fs::write(&self.migration_path, content).map_err(|e| SyncError::FileWrite {
                path: self.migration_path.clone(),
                message: e.to_string(),
            })?;
            tracing::info!(path = %self.migration_path.display(), "migration updated");
        } else {
            tracing::debug!(path = %self.migration_path.display(), "migration unchanged");
        }

        self.snapshots().commit()
    }
}

// ============================================================================
// GenerationSummary
// ============================================================================

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Seed files processed
    pub entities: usize,
    pub rows_added: usize,
    pub rows_updated: usize,
    pub rows_deleted: usize,
    pub seed_statements: usize,
    pub objects_created: usize,
    pub objects_replaced: usize,
    pub objects_unchanged: usize,
    pub objects_dropped: usize,
    pub object_statements: usize,
    /// Whether the migration text differs from what was on disk
    pub migration_changed: bool,
    pub snapshots_written: usize,
    pub snapshots_removed: usize,
    /// Nothing was written
    pub dry_run: bool,
}

impl GenerationSummary {
    /// True when neither engine produced a statement
    pub fn is_empty(&self) -> bool {
        self.seed_statements == 0 && self.object_statements == 0
    }

    /// Format the summary as a human-readable string.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(512);

        let title = if self.dry_run {
            "Migration Plan (dry run)"
        } else {
            "Migration Generation Complete"
        };
        out.push_str(&format!("{title}\n"));
        out.push_str(&format!(
            "  Seed data:   {} entities, {} added, {} updated, {} deleted ({} statements)\n",
            self.entities, self.rows_added, self.rows_updated, self.rows_deleted, self.seed_statements
        ));
        out.push_str(&format!(
            "  SQL objects: {} created, {} replaced, {} unchanged, {} dropped ({} statements)\n",
            self.objects_created,
            self.objects_replaced,
            self.objects_unchanged,
            self.objects_dropped,
            self.object_statements
        ));
        out.push_str(&format!(
            "  Migration:   {}\n",
            if self.migration_changed { "updated" } else { "unchanged" }
        ));
        out.push_str(&format!(
            "  Snapshots:   {} written, {} removed\n",
            self.snapshots_written, self.snapshots_removed
        ));

        out
    }
}

impl std::fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const MIGRATION: &str = "\
public partial class SeedDrinks : Migration
{
    protected override void Up(MigrationBuilder migrationBuilder)
    {
    }
}
";

    const DRINK_ID: &str = "0b4c1f2e-8d7a-4e55-9c1b-5a6f7e8d9c01";

    /// Helper: a complete input layout in a temp dir.
    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path();
            std::fs::create_dir_all(root.join("Seeds")).unwrap();
            std::fs::create_dir_all(root.join("SqlObjects/Functions")).unwrap();
            std::fs::create_dir_all(root.join("SqlObjects/Procedures")).unwrap();
            std::fs::write(root.join("Migration.cs"), MIGRATION).unwrap();
            std::fs::write(
                root.join("seedmap.json"),
                r#"{"Drink": {"Schema": "App", "Table": "Drinks"}}"#,
            )
            .unwrap();
            Self { dir }
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.dir.path().join(rel)
        }

        fn put(&self, rel: &str, content: &str) {
            std::fs::write(self.path(rel), content).unwrap();
        }

        fn read(&self, rel: &str) -> String {
            std::fs::read_to_string(self.path(rel)).unwrap()
        }

        fn config(&self) -> GeneratorConfig {
            GeneratorConfig::new()
                .with_migration(self.path("Migration.cs"))
                .with_seed_dir(self.path("Seeds"))
                .with_seed_snapshot_dir(self.path("Snapshots/Seeds"))
                .with_seed_map(self.path("seedmap.json"))
                .with_sql_objects_dir(self.path("SqlObjects"))
                .with_sql_objects_snapshot_dir(self.path("Snapshots/SqlObjects"))
        }

        fn run(&self) -> GenerationSummary {
            Generator::new(self.config()).run().unwrap()
        }
    }

    fn drink(name: &str) -> String {
        format!(r#"[{{"Id": "{DRINK_ID}", "Name": "{name}"}}]"#)
    }

    #[test]
    fn test_first_run_seed_insert() {
        let ws = Workspace::new();
        ws.put("Seeds/Drink.json", &drink("Mojito"));

        let summary = ws.run();
        assert_eq!(summary.rows_added, 1);
        assert_eq!(summary.seed_statements, 1);
        assert!(summary.migration_changed);

        let expected = format!(
            "\
public partial class SeedDrinks : Migration
{{
    protected override void Up(MigrationBuilder migrationBuilder)
    {{
        // BEGIN SEED DATA (generated)
        migrationBuilder.Sql(@\"INSERT INTO \"\"App\"\".\"\"Drinks\"\" (\"\"Id\"\", \"\"Name\"\") VALUES ('{DRINK_ID}', 'Mojito') ON CONFLICT (\"\"Id\"\") DO UPDATE SET \"\"Name\"\" = EXCLUDED.\"\"Name\"\";\");

        // END SEED DATA (generated)

        // BEGIN SQL OBJECTS (generated)
        // (no changes)
        // END SQL OBJECTS (generated)

    }}
}}
"
        );
        assert_eq!(ws.read("Migration.cs"), expected);
        assert!(ws.path("Snapshots/Seeds/Drink.snapshot.json").is_file());
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let ws = Workspace::new();
        ws.put("Seeds/Drink.json", &drink("Mojito"));
        ws.put(
            "SqlObjects/Functions/App.Total.sql",
            "-- TYPE: FUNCTION\n-- DROP: DROP FUNCTION \"App\".\"Total\"()\nSELECT 1;\n",
        );
        ws.run();
        let first = ws.read("Migration.cs");

        let summary = ws.run();
        assert!(summary.is_empty());
        let second = ws.read("Migration.cs");

        // regions now say "no changes"; a third run leaves the file alone
        assert_eq!(second.matches("// (no changes)").count(), 2);
        assert_ne!(first, second);
        let third = ws.run();
        assert!(!third.migration_changed);
        assert_eq!(ws.read("Migration.cs"), second);
    }

    #[test]
    fn test_update_and_delete() {
        let ws = Workspace::new();
        ws.put("Seeds/Drink.json", &drink("Mojito"));
        ws.run();

        ws.put("Seeds/Drink.json", &drink("Negroni"));
        let updated = ws.run();
        assert_eq!(updated.rows_updated, 1);
        assert!(ws.read("Migration.cs").contains("'Negroni'"));

        ws.put("Seeds/Drink.json", "[]");
        let deleted = ws.run();
        assert_eq!(deleted.rows_deleted, 1);
        assert!(ws.read("Migration.cs").contains(&format!(
            "DELETE FROM \"\"App\"\".\"\"Drinks\"\" WHERE \"\"Id\"\" IN ('{DRINK_ID}');"
        )));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let ws = Workspace::new();
        ws.put("Seeds/Drink.json", &drink("Mojito"));

        let summary = Generator::new(ws.config().dry_run(true)).run().unwrap();
        assert!(summary.dry_run);
        assert!(summary.migration_changed);
        assert_eq!(ws.read("Migration.cs"), MIGRATION);
        assert!(!ws.path("Snapshots").exists());
    }

    #[test]
    fn test_failure_leaves_files_untouched() {
        let ws = Workspace::new();
        ws.put("Seeds/Drink.json", &drink("Mojito"));
        ws.put("Seeds/Unmapped.json", "[]");

        let err = Generator::new(ws.config()).run().unwrap_err();
        assert!(matches!(err, SyncError::MissingSeedMapEntry(ref e) if e == "Unmapped"));
        assert_eq!(ws.read("Migration.cs"), MIGRATION);
        assert!(!ws.path("Snapshots").exists());
    }

    #[test]
    fn test_malformed_markers_abort() {
        let ws = Workspace::new();
        ws.put(
            "Migration.cs",
            &MIGRATION.replace("    {\n    }", "    {\n        // END SEED DATA (generated)\n    }"),
        );
        let err = Generator::new(ws.config()).run().unwrap_err();
        assert!(matches!(err, SyncError::MalformedRegion { .. }));
        assert!(!ws.path("Snapshots").exists());
    }

    #[test]
    fn test_crlf_seed_value_in_lf_migration() {
        let ws = Workspace::new();
        ws.put(
            "Seeds/Drink.json",
            &format!(r#"[{{"Id": "{DRINK_ID}", "Notes": "line1\r\nline2"}}]"#),
        );

        ws.run();
        assert!(ws.read("Migration.cs").contains("'line1\r\nline2'"));

        let second = ws.run();
        assert!(second.is_empty());
        let third = ws.run();
        assert!(!third.migration_changed);

        let content = ws.read("Migration.cs");
        assert!(content.starts_with("public partial class SeedDrinks : Migration\n{\n"));
        assert!(!content.contains('\r'));
        assert_eq!(content.matches("// (no changes)").count(), 2);
    }

    #[test]
    fn test_crlf_migration_keeps_seed_value_line_breaks() {
        let ws = Workspace::new();
        ws.put("Migration.cs", &MIGRATION.replace('\n', "\r\n"));
        ws.put(
            "Seeds/Drink.json",
            &format!(r#"[{{"Id": "{DRINK_ID}", "Notes": "line1\nline2"}}]"#),
        );

        ws.run();
        let content = ws.read("Migration.cs");
        assert!(content.contains("'line1\nline2'"));
        assert!(!content.contains("'line1\r\nline2'"));
        assert!(content.contains("        // END SEED DATA (generated)\r\n"));
    }

    #[test]
    fn test_bom_preserved() {
        let ws = Workspace::new();
        ws.put("Migration.cs", &format!("\u{feff}{MIGRATION}"));
        ws.run();
        let content = ws.read("Migration.cs");
        assert!(content.starts_with('\u{feff}'));
        assert_eq!(content.matches('\u{feff}').count(), 1);
    }

    #[test]
    fn test_dropped_object_snapshot_removed() {
        let ws = Workspace::new();
        ws.put(
            "SqlObjects/Procedures/App.Refresh.sql",
            "-- TYPE: PROCEDURE\n-- DROP: DROP PROCEDURE \"App\".\"Refresh\"()\nCALL x();\n",
        );
        ws.run();
        let snapshot = ws.path("Snapshots/SqlObjects/Procedures/App.Refresh.snapshot.sql");
        assert!(snapshot.is_file());

        std::fs::remove_file(ws.path("SqlObjects/Procedures/App.Refresh.sql")).unwrap();
        let summary = ws.run();
        assert_eq!(summary.objects_dropped, 1);
        assert_eq!(summary.snapshots_removed, 1);
        assert!(!snapshot.exists());
        assert!(
            ws.read("Migration.cs")
                .contains("DROP PROCEDURE \"\"App\"\".\"\"Refresh\"\"();")
        );
    }

    #[test]
    fn test_summary_display() {
        let summary = GenerationSummary {
            entities: 2,
            rows_added: 3,
            seed_statements: 1,
            migration_changed: true,
            ..GenerationSummary::default()
        };
        let text = summary.to_string();
        assert!(text.starts_with("Migration Generation Complete"));
        assert!(text.contains("2 entities, 3 added"));
        assert!(text.contains("Migration:   updated"));
    }
}

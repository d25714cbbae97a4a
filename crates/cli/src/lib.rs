//! # Seedsync CLI
//!
//! Command-line interface for Seedsync.
//!
//! One invocation performs one generation run: every input path comes from a
//! flag, its `SEEDSYNC_*` environment variable, or a `--config` TOML file,
//! in that order of precedence.
//!

pub mod config;

// Re-export dependencies for use in main.rs
pub use seedsync_codegen;
pub use seedsync_core;
pub use seedsync_ir;

use clap::Parser;
use config::FileConfig;
use seedsync_codegen::{GenerationSummary, Generator, GeneratorConfig};
use seedsync_core::{SyncError, SyncResult};
use std::path::PathBuf;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Regenerate the seed-data and SQL-object regions of a migration file
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "seedsync", version, about)]
pub struct Cli {
    /// Migration file to patch
    #[arg(long, env = "SEEDSYNC_MIGRATION", value_name = "FILE")]
    pub migration: Option<PathBuf>,

    /// Directory of <Entity>.json seed files
    #[arg(long, env = "SEEDSYNC_SEED_DIR", value_name = "DIR")]
    pub seed_dir: Option<PathBuf>,

    /// Directory for seed snapshots
    #[arg(long, env = "SEEDSYNC_SEED_SNAPSHOT_DIR", value_name = "DIR")]
    pub seed_snapshot_dir: Option<PathBuf>,

    /// JSON file mapping entities to schema and table
    #[arg(long, env = "SEEDSYNC_SEED_MAP", value_name = "FILE")]
    pub seed_map: Option<PathBuf>,

    /// Directory holding Functions/ and Procedures/
    #[arg(long = "sqlobjects-dir", env = "SEEDSYNC_SQLOBJECTS_DIR", value_name = "DIR")]
    pub sql_objects_dir: Option<PathBuf>,

    /// Directory for SQL object snapshots
    #[arg(
        long = "sqlobjects-snapshot-dir",
        env = "SEEDSYNC_SQLOBJECTS_SNAPSHOT_DIR",
        value_name = "DIR"
    )]
    pub sql_objects_snapshot_dir: Option<PathBuf>,

    /// TOML file supplying any of the paths above
    #[arg(short, long, env = "SEEDSYNC_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report what would change without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Log debug detail
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Filter directive implied by `--verbose`/`--quiet`, if any
    pub fn log_directive(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("warn")
        } else {
            None
        }
    }

    /// Merge flags with the config file into a generator configuration.
    pub fn resolve_config(&self) -> SyncResult<GeneratorConfig> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        fn pick(flag: &Option<PathBuf>, file: Option<PathBuf>, name: &str) -> SyncResult<PathBuf> {
            flag.clone()
                .or(file)
                .ok_or_else(|| SyncError::MissingArgument(format!("--{name}")))
        }

        Ok(GeneratorConfig::new()
            .with_migration(pick(&self.migration, file.migration, "migration")?)
            .with_seed_dir(pick(&self.seed_dir, file.seed_dir, "seed-dir")?)
            .with_seed_snapshot_dir(pick(
                &self.seed_snapshot_dir,
                file.seed_snapshot_dir,
                "seed-snapshot-dir",
            )?)
            .with_seed_map(pick(&self.seed_map, file.seed_map, "seed-map")?)
            .with_sql_objects_dir(pick(
                &self.sql_objects_dir,
                file.sqlobjects_dir,
                "sqlobjects-dir",
            )?)
            .with_sql_objects_snapshot_dir(pick(
                &self.sql_objects_snapshot_dir,
                file.sqlobjects_snapshot_dir,
                "sqlobjects-snapshot-dir",
            )?)
            .dry_run(self.dry_run))
    }
}

/// Install the stderr subscriber.
///
/// `--verbose`/`--quiet` win over `RUST_LOG`, which wins over `info`.
pub fn init_tracing(cli: &Cli) {
    use tracing_subscriber::EnvFilter;

    let filter = match cli.log_directive() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve the configuration and perform one run.
pub fn run(cli: &Cli) -> anyhow::Result<GenerationSummary> {
    let config = cli.resolve_config()?;
    tracing::debug!(?config, "configuration resolved");
    let summary = Generator::new(config).run()?;
    Ok(summary)
}

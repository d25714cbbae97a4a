//! # Seedsync IR
//!
//! In-memory representation of the generator's inputs and of the state it
//! persists between runs.
//!
//! ## Core Concepts
//!
//! - **SeedDataset**: the normalized rows of one entity, keyed by `Id`
//! - **SeedMap**: which schema/table each seeded entity targets
//! - **SqlObjectInfo**: a stored function or procedure with its TYPE/DROP header
//! - **Snapshot**: the normalized state written by the previous successful run
//!
//! Everything here is normalized on load (see [`normalize`]) so that
//! formatting-only edits never register as changes.
//!

// Module declarations
pub mod fs;
pub mod normalize;
pub mod seed;
pub mod seed_map;
pub mod snapshot;
pub mod sql_object;

// Re-export commonly used types at crate root
pub use normalize::{normalize_json, normalize_sql};
pub use seed::{ID_FIELD, SeedDataset, SeedItem};
pub use seed_map::SeedMap;
pub use snapshot::{SnapshotBatch, SnapshotWrite, object_snapshot_path, seed_snapshot_path};
pub use sql_object::{SqlHeader, SqlObjectInfo, SqlObjectSet, load_objects, load_snapshots};

// Re-export core types that are commonly used with IR
pub use seedsync_core::{ObjectKey, SqlObjectType, SyncError, SyncResult, TableRef};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

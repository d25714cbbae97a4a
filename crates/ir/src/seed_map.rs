//! Entity-to-table mapping for seed files
//!
//! The seed map is a JSON object keyed by entity name:
//!
//! ```json
//! {
//!   "Drink": { "Schema": "App", "Table": "Drinks" }
//! }
//! ```
//!
//! Every seed file present in the seed directory must have an entry.

use crate::fs::read_text;
use crate::normalize::parse_json;
use seedsync_core::{SyncError, SyncResult, TableRef, Validatable};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Lookup from entity name to target table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedMap {
    entries: BTreeMap<String, TableRef>,
}

impl SeedMap {
    /// Create an empty seed map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    pub fn insert(&mut self, entity: impl Into<String>, table: TableRef) {
        self.entries.insert(entity.into(), table);
    }

    /// Load and validate a seed map file
    pub fn load(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let text = read_text(path)?;
        let map = Self::from_json_str(&text, path)?;
        tracing::debug!(path = %path.display(), entries = map.len(), "seed map loaded");
        Ok(map)
    }

    /// Parse seed map JSON; `path` is only used for error messages
    pub fn from_json_str(text: &str, path: &Path) -> SyncResult<Self> {
        let root = parse_json(text, path)?;
        let Value::Object(root) = root else {
            return Err(SyncError::seed_map(
                path.display().to_string(),
                "seed map must be a JSON object",
            ));
        };

        let mut map = SeedMap::new();
        for (entity, value) in &root {
            let Value::Object(entry) = value else {
                return Err(SyncError::seed_map(entity, "entry must be an object"));
            };
            let schema = entry.get("Schema").and_then(Value::as_str).unwrap_or_default();
            let table = entry.get("Table").and_then(Value::as_str).unwrap_or_default();
            map.insert(entity.clone(), TableRef::new(schema, table));
        }

        map.validate()?;
        Ok(map)
    }

    /// Table for `entity`, if mapped
    pub fn get(&self, entity: &str) -> Option<&TableRef> {
        self.entries.get(entity)
    }

    /// Table for `entity`, or a fatal error naming the entity
    pub fn require(&self, entity: &str) -> SyncResult<&TableRef> {
        self.get(entity)
            .ok_or_else(|| SyncError::MissingSeedMapEntry(entity.to_string()))
    }

    /// Mapped entity names, in ordinal order
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Validatable for SeedMap {
    fn validate(&self) -> SyncResult<()> {
        for (entity, table) in &self.entries {
            if table.schema.trim().is_empty() || table.table.trim().is_empty() {
                return Err(SyncError::seed_map(entity, "must include Schema and Table"));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

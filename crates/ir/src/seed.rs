//! Seed datasets
//!
//! A seed file is a JSON array of objects, one per row, each carrying an
//! `Id` UUID. Loading a file normalizes every row (see
//! [`normalize_json`](crate::normalize::normalize_json)), indexes rows by
//! id and re-serializes the whole dataset as the snapshot body.
//!
//! Snapshot files share the same format, so the previous state is loaded
//! with the same code path.

use crate::fs::read_text;
use crate::normalize::{canonical_text, normalize_object, parse_json};
use crate::snapshot::seed_snapshot_path;
use seedsync_core::{SyncError, SyncResult};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

/// Name of the identifier field of every seed row
pub const ID_FIELD: &str = "Id";

/// File extension of seed source files
pub const SEED_EXTENSION: &str = ".json";

// ============================================================================
// SeedItem
// ============================================================================

/// One normalized seed row
#[derive(Debug, Clone, PartialEq)]
pub struct SeedItem {
    /// Row identity
    pub id: Uuid,

    /// Fields in ordinal key order, values normalized
    pub fields: Map<String, Value>,

    /// Compact canonical serialization, used for change detection
    pub normalized_text: String,
}

impl SeedItem {
    /// Value of `column`, if present on this row
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Field names in ordinal order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Whether this row differs from `other` in any field
    pub fn differs_from(&self, other: &SeedItem) -> bool {
        self.normalized_text != other.normalized_text
    }
}

// ============================================================================
// SeedDataset
// ============================================================================

/// All rows of one entity, keyed by id
#[derive(Debug, Clone, PartialEq)]
pub struct SeedDataset {
    items: BTreeMap<Uuid, SeedItem>,
    normalized_array: String,
}

impl Default for SeedDataset {
    fn default() -> Self {
        Self::empty()
    }
}

impl SeedDataset {
    /// A dataset with no rows
    pub fn empty() -> Self {
        Self {
            items: BTreeMap::new(),
            normalized_array: "[]".to_string(),
        }
    }

    /// Load a seed file or seed snapshot
    pub fn load(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let text = read_text(path)?;
        let dataset = Self::from_json_str(&text, path)?;
        tracing::debug!(path = %path.display(), rows = dataset.len(), "seed data loaded");
        Ok(dataset)
    }

    /// Load the snapshot for `entity`, or an empty dataset when none exists
    pub fn load_snapshot(snapshot_dir: impl AsRef<Path>, entity: &str) -> SyncResult<Self> {
        let path = seed_snapshot_path(snapshot_dir, entity);
        if !path.is_file() {
            tracing::debug!(entity, "no seed snapshot, treating as empty");
            return Ok(Self::empty());
        }
        Self::load(path)
    }

    /// Parse seed JSON; `path` is only used for error messages
    pub fn from_json_str(text: &str, path: &Path) -> SyncResult<Self> {
        let Value::Array(rows) = parse_json(text, path)? else {
            return Err(SyncError::seed_file(path, "seed file must be a JSON array"));
        };

        let mut items = BTreeMap::new();
        for (index, row) in rows.iter().enumerate() {
            let Value::Object(row) = row else {
                return Err(SyncError::seed_file(
                    path,
                    format!("element {index} is not an object"),
                ));
            };

            let id = parse_id(row, index, path)?;
            let fields = normalize_object(row);
            let normalized_text = canonical_text(&Value::Object(fields.clone()))?;
            let item = SeedItem {
                id,
                fields,
                normalized_text,
            };

            if items.insert(id, item).is_some() {
                return Err(SyncError::DuplicateId {
                    path: path.to_path_buf(),
                    id: id.hyphenated().to_string(),
                });
            }
        }

        let array: Vec<Value> = items
            .values()
            .map(|item| Value::Object(item.fields.clone()))
            .collect();
        let normalized_array = serde_json::to_string_pretty(&Value::Array(array))?;

        Ok(Self {
            items,
            normalized_array,
        })
    }

    /// Row with `id`, if present
    pub fn get(&self, id: &Uuid) -> Option<&SeedItem> {
        self.items.get(id)
    }

    /// Whether a row with `id` exists
    pub fn contains(&self, id: &Uuid) -> bool {
        self.items.contains_key(id)
    }

    /// Rows in ascending id order
    pub fn items(&self) -> impl Iterator<Item = &SeedItem> {
        self.items.values()
    }

    /// Full normalized dataset as an indented JSON array (the snapshot body)
    pub fn normalized_array(&self) -> &str {
        &self.normalized_array
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn parse_id(row: &Map<String, Value>, index: usize, path: &Path) -> SyncResult<Uuid> {
    match row.get(ID_FIELD) {
        None | Some(Value::Null) => Err(SyncError::seed_file(
            path,
            format!("element {index} is missing {ID_FIELD}"),
        )),
        Some(Value::String(text)) => Uuid::parse_str(text.trim()).map_err(|_| SyncError::InvalidId {
            path: path.to_path_buf(),
            value: text.clone(),
        }),
        Some(other) => Err(SyncError::InvalidId {
            path: path.to_path_buf(),
            value: other.to_string(),
        }),
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

    const ID_A: &str = "00000000-0000-0000-0000-00000000000a";
    const ID_B: &str = "00000000-0000-0000-0000-00000000000b";

    fn parse(text: &str) -> SyncResult<SeedDataset> {
        SeedDataset::from_json_str(text, Path::new("Drink.json"))
    }

    #[test]
    fn test_load_rows_by_id() {
        let dataset = parse(&format!(
            r#"[{{"Id": "{ID_B}", "Name": "Negroni"}}, {{"Name": "Mojito", "Id": "{ID_A}"}}]"#
        ))
        .unwrap();

        assert_eq!(dataset.len(), 2);
        let a = dataset.get(&Uuid::parse_str(ID_A).unwrap()).unwrap();
        assert_eq!(a.normalized_text, format!(r#"{{"Id":"{ID_A}","Name":"Mojito"}}"#));
        let ids: Vec<Uuid> = dataset.items().map(|i| i.id).collect();
        assert_eq!(
            ids,
            vec![Uuid::parse_str(ID_A).unwrap(), Uuid::parse_str(ID_B).unwrap()]
        );
    }

    #[test]
    fn test_normalized_array_is_indented_and_sorted() {
        let dataset = parse(&format!(
            r#"[{{"Name": "Negroni", "Id": "{ID_B}"}}, {{"Id": "{ID_A}", "Name": "Mojito"}}]"#
        ))
        .unwrap();

        let expected = format!(
            "[\n  {{\n    \"Id\": \"{ID_A}\",\n    \"Name\": \"Mojito\"\n  }},\n  {{\n    \"Id\": \"{ID_B}\",\n    \"Name\": \"Negroni\"\n  }}\n]"
        );
        assert_eq!(dataset.normalized_array(), expected);
    }

    #[test]
    fn test_snapshot_round_trip_is_stable() {
        let dataset = parse(&format!(r#"[{{"Name": "Mojito", "Id": "{ID_A}", "Tags": {{"z": 1, "a": 2}}}}]"#)).unwrap();
        let reloaded = parse(dataset.normalized_array()).unwrap();
        assert_eq!(reloaded, dataset);
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = parse("[]").unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.normalized_array(), "[]");
        assert_eq!(SeedDataset::empty(), dataset);
    }

    #[test]
    fn test_guid_forms_accepted() {
        let dataset = parse(r#"[{"Id": "{00000000-0000-0000-0000-00000000000A}"}, {"Id": "0000000000000000000000000000000b"}]"#).unwrap();
        assert!(dataset.contains(&Uuid::parse_str(ID_A).unwrap()));
        assert!(dataset.contains(&Uuid::parse_str(ID_B).unwrap()));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = parse(&format!(r#"[{{"Id": "{ID_A}"}}, {{"Id": "{}"}}]"#, ID_A.to_uppercase())).unwrap_err();
        assert!(matches!(err, SyncError::DuplicateId { .. }));
        assert!(err.to_string().contains(ID_A));
    }

    #[test]
    fn test_non_uuid_id_rejected() {
        let err = parse(r#"[{"Id": "drink-1"}]"#).unwrap_err();
        assert!(matches!(err, SyncError::InvalidId { .. }));

        let err = parse(r#"[{"Id": 42}]"#).unwrap_err();
        assert!(matches!(err, SyncError::InvalidId { .. }));
    }

    #[test]
    fn test_missing_id_rejected() {
        let err = parse(r#"[{"Name": "Mojito"}]"#).unwrap_err();
        assert!(err.to_string().contains("missing Id"));
    }

    #[test]
    fn test_shape_errors() {
        assert!(parse(r#"{"Id": "x"}"#).unwrap_err().to_string().contains("JSON array"));
        assert!(parse("[1]").unwrap_err().to_string().contains("not an object"));
        assert!(matches!(parse("[").unwrap_err(), SyncError::JsonParse { .. }));
    }

    #[test]
    fn test_missing_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let dataset = SeedDataset::load_snapshot(dir.path(), "Drink").unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_load_snapshot_from_disk() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Drink.snapshot.json"),
            format!(r#"[{{"Id": "{ID_A}"}}]"#),
        )
        .unwrap();
        let dataset = SeedDataset::load_snapshot(dir.path(), "Drink").unwrap();
        assert_eq!(dataset.len(), 1);
    }
}

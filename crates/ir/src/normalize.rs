//! Canonical forms for stable comparison
//!
//! Seed rows and SQL object bodies are compared by their canonical text, so
//! two inputs that differ only in key order, line endings or trailing
//! whitespace are treated as unchanged.

use serde_json::{Map, Value};
use seedsync_core::{SyncError, SyncResult};
use std::path::Path;

/// Recursively sort object keys by ordinal byte order.
///
/// Arrays keep their element order and scalars are copied by value.
pub fn normalize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(normalize_object(map)),
        Value::Array(items) => Value::Array(items.iter().map(normalize_json).collect()),
        scalar => scalar.clone(),
    }
}

/// Object variant of [`normalize_json`].
pub fn normalize_object(map: &Map<String, Value>) -> Map<String, Value> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    let mut normalized = Map::with_capacity(map.len());
    for key in keys {
        normalized.insert(key.clone(), normalize_json(&map[key.as_str()]));
    }
    normalized
}

/// Unify line endings to `\n` and trim trailing whitespace from every line.
///
/// Blank lines and comment lines are kept.
pub fn normalize_sql(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    unified
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse JSON text, naming `path` in the error on failure.
pub fn parse_json(text: &str, path: &Path) -> SyncResult<Value> {
    serde_json::from_str(text).map_err(|e| SyncError::JsonParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Compact canonical serialization of an already-normalized value.
pub fn canonical_text(value: &Value) -> SyncResult<String> {
    Ok(serde_json::to_string(value)?)
}

// ============================================================================
// Tests
// ============================================================================

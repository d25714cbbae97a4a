//! SQL object definitions
//!
//! Stored functions and procedures live one per file under a `Functions/`
//! or `Procedures/` folder, named `<schema>.<name>.sql`. Each file starts
//! with a mandatory two-line header:
//!
//! ```sql
//! -- TYPE: FUNCTION
//! -- DROP: DROP FUNCTION IF EXISTS "Public"."CalcTotal"(integer);
//! CREATE OR REPLACE FUNCTION "Public"."CalcTotal"(...)
//! ```
//!
//! The TYPE must match the folder. The DROP value is the statement used once
//! the file disappears. Snapshots (`<schema>.<name>.snapshot.sql`) carry the
//! same header, which is how a removed object's drop statement is recovered.

use crate::fs::{file_name, list_files, read_text, strip_suffix_ignore_case};
use crate::normalize::normalize_sql;
use crate::snapshot::{OBJECT_SNAPSHOT_SUFFIX, object_snapshot_path};
use seedsync_core::{ObjectKey, SqlObjectType, SyncError, SyncResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Header prefix declaring the object kind
pub const TYPE_PREFIX: &str = "-- TYPE:";

/// Header prefix declaring the drop statement
pub const DROP_PREFIX: &str = "-- DROP:";

/// File suffix of SQL object sources
pub const SQL_SUFFIX: &str = ".sql";

// ============================================================================
// Header
// ============================================================================

/// Parsed two-line header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlHeader {
    pub object_type: SqlObjectType,
    pub drop_statement: String,
}

/// Parse the TYPE/DROP header from normalized content.
///
/// This is fixed-prefix matching on the first two lines, not SQL parsing.
pub fn parse_header(normalized: &str, path: &Path) -> SyncResult<SqlHeader> {
    let mut lines = normalized.split('\n');
    let (Some(type_line), Some(drop_line)) = (lines.next(), lines.next()) else {
        return Err(SyncError::sql_header(path, "missing required header lines"));
    };

    let type_value = strip_prefix_ignore_case(type_line.trim(), TYPE_PREFIX)
        .ok_or_else(|| SyncError::sql_header(path, format!("missing {TYPE_PREFIX} header")))?;
    let drop_value = strip_prefix_ignore_case(drop_line.trim(), DROP_PREFIX)
        .ok_or_else(|| SyncError::sql_header(path, format!("missing {DROP_PREFIX} header")))?;

    let object_type = SqlObjectType::parse(type_value).ok_or_else(|| {
        SyncError::sql_header(path, "TYPE must be FUNCTION or PROCEDURE")
    })?;

    let drop_statement = drop_value.trim();
    if drop_statement.is_empty() {
        return Err(SyncError::sql_header(path, "DROP header is empty"));
    }

    Ok(SqlHeader {
        object_type,
        drop_statement: drop_statement.to_string(),
    })
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}

// ============================================================================
// SqlObjectInfo
// ============================================================================

/// One SQL object, loaded either from source or from its snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlObjectInfo {
    /// Type-qualified identity
    pub key: ObjectKey,

    /// Whole file content, normalized (header included)
    pub normalized_content: String,

    /// Statement from the DROP header
    pub drop_statement: String,

    /// Where this object's snapshot lives
    pub snapshot_path: PathBuf,
}

impl SqlObjectInfo {
    pub fn object_type(&self) -> SqlObjectType {
        self.key.object_type
    }

    /// Parse a source file found in the folder for `expected`.
    pub fn from_source(
        path: &Path,
        content: &str,
        expected: SqlObjectType,
        snapshot_dir: &Path,
    ) -> SyncResult<Self> {
        let name = file_name(path);
        let stem = strip_suffix_ignore_case(&name, SQL_SUFFIX).unwrap_or(name.as_str());
        let (schema, object_name) = split_qualified(stem).ok_or_else(|| {
            SyncError::InvalidObjectFileName {
                path: path.to_path_buf(),
                expected: "<Schema>.<Name>.sql".to_string(),
            }
        })?;

        let normalized_content = normalize_sql(content);
        let header = parse_header(&normalized_content, path)?;
        if header.object_type != expected {
            return Err(SyncError::TypeMismatch {
                path: path.to_path_buf(),
                expected: expected.to_string(),
                found: header.object_type.to_string(),
            });
        }

        Ok(Self {
            key: ObjectKey::new(header.object_type, schema, object_name),
            snapshot_path: object_snapshot_path(snapshot_dir, expected, schema, object_name),
            normalized_content,
            drop_statement: header.drop_statement,
        })
    }

    /// Parse a snapshot file. The snapshot's own header defines its key.
    pub fn from_snapshot(path: &Path, content: &str) -> SyncResult<Self> {
        let name = file_name(path);
        let (schema, object_name) = strip_suffix_ignore_case(&name, OBJECT_SNAPSHOT_SUFFIX)
            .and_then(split_qualified)
            .ok_or_else(|| SyncError::InvalidObjectFileName {
                path: path.to_path_buf(),
                expected: "<Schema>.<Name>.snapshot.sql".to_string(),
            })?;

        let normalized_content = normalize_sql(content);
        let header = parse_header(&normalized_content, path)?;

        Ok(Self {
            key: ObjectKey::new(header.object_type, schema, object_name),
            snapshot_path: path.to_path_buf(),
            normalized_content,
            drop_statement: header.drop_statement,
        })
    }
}

fn split_qualified(stem: &str) -> Option<(&str, &str)> {
    let (schema, name) = stem.split_once('.')?;
    if schema.is_empty() || name.is_empty() {
        return None;
    }
    Some((schema, name))
}

// ============================================================================
// Loading
// ============================================================================

/// SQL objects indexed by key
pub type SqlObjectSet = BTreeMap<ObjectKey, SqlObjectInfo>;

/// Load every current SQL object under `objects_dir/{Functions,Procedures}`.
///
/// Missing folders are treated as empty. Duplicate keys are fatal.
pub fn load_objects(objects_dir: &Path, snapshot_dir: &Path) -> SyncResult<SqlObjectSet> {
    let mut objects = SqlObjectSet::new();
    for object_type in SqlObjectType::all() {
        let folder = objects_dir.join(object_type.folder_name());
        for path in list_files(&folder, SQL_SUFFIX)? {
            let content = read_text(&path)?;
            let info = SqlObjectInfo::from_source(&path, &content, *object_type, snapshot_dir)?;
            tracing::debug!(key = %info.key, path = %path.display(), "sql object loaded");
            if objects.contains_key(&info.key) {
                return Err(SyncError::DuplicateObject(info.key.to_string()));
            }
            objects.insert(info.key.clone(), info);
        }
    }
    Ok(objects)
}

/// Load every SQL object snapshot under `snapshot_dir/{Functions,Procedures}`.
pub fn load_snapshots(snapshot_dir: &Path) -> SyncResult<SqlObjectSet> {
    let mut snapshots = SqlObjectSet::new();
    for object_type in SqlObjectType::all() {
        let folder = snapshot_dir.join(object_type.folder_name());
        for path in list_files(&folder, OBJECT_SNAPSHOT_SUFFIX)? {
            let content = read_text(&path)?;
            let info = SqlObjectInfo::from_snapshot(&path, &content)?;
            if snapshots.contains_key(&info.key) {
                return Err(SyncError::DuplicateSnapshot(info.key.to_string()));
            }
            snapshots.insert(info.key.clone(), info);
        }
    }
    Ok(snapshots)
}

// ============================================================================
// Tests
// ============================================================================

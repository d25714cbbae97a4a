//! Core types used throughout seedsync
//!
//! This module contains the small vocabulary shared by the seed loaders,
//! the SQL object loaders and the code generators.

use serde::{Deserialize, Serialize};

// ============================================================================
// SQL Object Types
// ============================================================================

/// Kind of stored SQL object managed by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlObjectType {
    Function,
    Procedure,
}

impl SqlObjectType {
    /// Header value as written after `-- TYPE:`
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlObjectType::Function => "FUNCTION",
            SqlObjectType::Procedure => "PROCEDURE",
        }
    }

    /// Name of the folder holding objects of this kind
    pub fn folder_name(&self) -> &'static str {
        match self {
            SqlObjectType::Function => "Functions",
            SqlObjectType::Procedure => "Procedures",
        }
    }

    /// Parse a header value (case-insensitive, surrounding whitespace ignored)
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(value))
    }

    /// All object kinds, in folder scan order
    pub fn all() -> &'static [SqlObjectType] {
        &[SqlObjectType::Function, SqlObjectType::Procedure]
    }
}

impl std::fmt::Display for SqlObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Table References
// ============================================================================

/// Target table of a seeded entity, as declared in the seed map
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    #[serde(rename = "Schema")]
    pub schema: String,
    #[serde(rename = "Table")]
    pub table: String,
}

impl TableRef {
    /// Create a new table reference
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

// ============================================================================
// Object Keys
// ============================================================================

/// Identity of a SQL object: `<TYPE>:<schema>.<name>`
///
/// The type is part of the key so a function and a procedure sharing a
/// qualified name are tracked independently.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub object_type: SqlObjectType,
    pub schema: String,
    pub name: String,
}

impl ObjectKey {
    /// Create a new object key
    pub fn new(
        object_type: SqlObjectType,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            object_type,
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Qualified name without the type prefix
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}.{}", self.object_type, self.schema, self.name)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_parse() {
        assert_eq!(SqlObjectType::parse("FUNCTION"), Some(SqlObjectType::Function));
        assert_eq!(SqlObjectType::parse(" procedure "), Some(SqlObjectType::Procedure));
        assert_eq!(SqlObjectType::parse("VIEW"), None);
        assert_eq!(SqlObjectType::parse(""), None);
    }

    #[test]
    fn test_object_type_folders() {
        assert_eq!(SqlObjectType::Function.folder_name(), "Functions");
        assert_eq!(SqlObjectType::Procedure.folder_name(), "Procedures");
        assert_eq!(SqlObjectType::all().len(), 2);
    }

    #[test]
    fn test_object_key_display() {
        let key = ObjectKey::new(SqlObjectType::Function, "Public", "CalcTotal");
        assert_eq!(key.to_string(), "FUNCTION:Public.CalcTotal");
        assert_eq!(key.qualified_name(), "Public.CalcTotal");
    }

    #[test]
    fn test_object_key_type_distinguishes() {
        let func = ObjectKey::new(SqlObjectType::Function, "App", "Refresh");
        let proc = ObjectKey::new(SqlObjectType::Procedure, "App", "Refresh");
        assert_ne!(func, proc);
        assert!(func < proc);
    }

    #[test]
    fn test_table_ref_deserialize() {
        let table: TableRef =
            serde_json::from_str(r#"{"Schema": "App", "Table": "Drinks"}"#).unwrap();
        assert_eq!(table, TableRef::new("App", "Drinks"));
        assert_eq!(table.to_string(), "App.Drinks");
    }
}

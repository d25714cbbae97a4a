//! # SQL Rendering Helpers
//!
//! Literal and identifier quoting shared by the seed and SQL object
//! generators. The target dialect is PostgreSQL.
//!
//! | JSON value      | SQL literal                      |
//! |-----------------|----------------------------------|
//! | `null`          | `NULL`                           |
//! | string          | `'text'` (embedded `'` doubled)  |
//! | number          | raw numeric text                 |
//! | `true`/`false`  | `TRUE` / `FALSE`                 |
//! | object / array  | `'{"compact":"json"}'`           |

use seedsync_core::TableRef;
use serde_json::Value;

/// Render a JSON value as a SQL literal.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_string(s),
        Value::Array(_) | Value::Object(_) => quote_string(&value.to_string()),
    }
}

/// Single-quote a string, doubling embedded quotes.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"schema"."table"`
pub fn qualified_table(table: &TableRef) -> String {
    format!("{}.{}", quote_ident(&table.schema), quote_ident(&table.table))
}

/// Trim trailing whitespace and make sure the statement ends with `;`.
pub fn ensure_semicolon(sql: &str) -> String {
    let trimmed = sql.trim_end();
    if trimmed.ends_with(';') {
        trimmed.to_string()
    } else {
        format!("{trimmed};")
    }
}

// ============================================================================
// Tests
// ============================================================================

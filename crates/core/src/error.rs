//! Error types for seedsync
//!
//! This module provides unified error handling across the generator,
//! covering configuration problems, invalid seed and SQL object inputs,
//! migration patching failures, IO errors and serialization errors.
//!
//! Every variant is fatal to a run. Messages always name the offending
//! path, key or entity so the invoker can fix the input and re-run.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for seedsync
#[derive(Debug, Error)]
pub enum SyncError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A required path argument was not supplied
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A referenced input file or directory does not exist
    #[error("{what} not found: {}", .path.display())]
    PathNotFound { what: String, path: PathBuf },

    // ========================================================================
    // Seed Data Errors
    // ========================================================================
    /// The seed map is malformed
    #[error("Invalid seed map entry '{entry}': {message}")]
    InvalidSeedMap { entry: String, message: String },

    /// A seed file has no seed map entry
    #[error("Missing seed map entry for entity '{0}'")]
    MissingSeedMapEntry(String),

    /// A seed file does not have the expected shape
    #[error("Invalid seed file '{}': {message}", .path.display())]
    InvalidSeedFile { path: PathBuf, message: String },

    /// A seed row's `Id` is not a UUID
    #[error("Seed row Id '{value}' is not a UUID in '{}'", .path.display())]
    InvalidId { path: PathBuf, value: String },

    /// Two seed rows share an `Id`
    #[error("Duplicate Id '{id}' in seed file '{}'", .path.display())]
    DuplicateId { path: PathBuf, id: String },

    /// A JSON document could not be parsed
    #[error("Failed to parse JSON in '{}': {message}", .path.display())]
    JsonParse { path: PathBuf, message: String },

    // ========================================================================
    // SQL Object Errors
    // ========================================================================
    /// File name does not follow `<schema>.<name>.sql`
    #[error("Invalid SQL object file name '{}': expected {expected}", .path.display())]
    InvalidObjectFileName { path: PathBuf, expected: String },

    /// The two-line TYPE/DROP header is missing or malformed
    #[error("Invalid SQL object header in '{}': {message}", .path.display())]
    InvalidSqlHeader { path: PathBuf, message: String },

    /// The TYPE header disagrees with the folder the file lives in
    #[error("SQL object TYPE mismatch in '{}': expected {expected}, found {found}", .path.display())]
    TypeMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// Two current SQL object files resolve to the same key
    #[error("Duplicate SQL object '{0}'")]
    DuplicateObject(String),

    /// Two snapshot files resolve to the same key
    #[error("Duplicate SQL object snapshot '{0}'")]
    DuplicateSnapshot(String),

    // ========================================================================
    // Migration Patching Errors
    // ========================================================================
    /// The forward migration method could not be located
    #[error("Could not locate migration method: expected one of {0}")]
    MethodNotFound(String),

    /// Region markers are unpaired, repeated or out of order
    #[error("Region markers are malformed for '{marker}': {message}")]
    MalformedRegion { marker: String, message: String },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{}': {message}", .path.display())]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{}': {message}", .path.display())]
    FileWrite { path: PathBuf, message: String },

    /// File removal error
    #[error("Failed to remove file '{}': {message}", .path.display())]
    FileRemove { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{}': {message}", .path.display())]
    DirectoryCreate { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl SyncError {
    /// Create a path-not-found error
    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        SyncError::PathNotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    /// Create a seed file shape error
    pub fn seed_file(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        SyncError::InvalidSeedFile {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a seed map error
    pub fn seed_map(entry: impl Into<String>, msg: impl Into<String>) -> Self {
        SyncError::InvalidSeedMap {
            entry: entry.into(),
            message: msg.into(),
        }
    }

    /// Create a SQL header error
    pub fn sql_header(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        SyncError::InvalidSqlHeader {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a malformed region error
    pub fn malformed_region(marker: impl Into<String>, msg: impl Into<String>) -> Self {
        SyncError::MalformedRegion {
            marker: marker.into(),
            message: msg.into(),
        }
    }

    /// Create a file read error
    pub fn read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        SyncError::FileRead {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        SyncError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error comes from invocation configuration
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            SyncError::MissingArgument(_) | SyncError::InvalidConfig(_)
        )
    }

    /// Check if this error was caused by invalid input files
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            SyncError::PathNotFound { .. }
                | SyncError::InvalidSeedMap { .. }
                | SyncError::MissingSeedMapEntry(_)
                | SyncError::InvalidSeedFile { .. }
                | SyncError::InvalidId { .. }
                | SyncError::DuplicateId { .. }
                | SyncError::JsonParse { .. }
                | SyncError::InvalidObjectFileName { .. }
                | SyncError::InvalidSqlHeader { .. }
                | SyncError::TypeMismatch { .. }
                | SyncError::DuplicateObject(_)
                | SyncError::DuplicateSnapshot(_)
                | SyncError::MethodNotFound(_)
                | SyncError::MalformedRegion { .. }
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            SyncError::Io(_)
                | SyncError::FileRead { .. }
                | SyncError::FileWrite { .. }
                | SyncError::FileRemove { .. }
                | SyncError::DirectoryCreate { .. }
        )
    }
}

/// Result type alias using SyncError
pub type SyncResult<T> = Result<T, SyncError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> SyncResult<T>;
}

impl<T, E: Into<SyncError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> SyncResult<T> {
        self.map_err(|e| {
            let err: SyncError = e.into();
            SyncError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

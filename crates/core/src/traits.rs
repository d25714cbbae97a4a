//! Core traits for seedsync
//!
//! This module defines the traits that loaded inputs and configuration
//! implement to provide consistent up-front validation.

use crate::error::SyncResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return an error describing the first problem found.
///
/// # Example
///
/// ```rust,ignore
/// use seedsync_core::{SyncError, SyncResult, Validatable};
///
/// struct Paths {
///     migration: std::path::PathBuf,
/// }
///
/// impl Validatable for Paths {
///     fn validate(&self) -> SyncResult<()> {
///         if !self.migration.is_file() {
///             return Err(SyncError::not_found("Migration file", &self.migration));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `SyncError` describing the problem.
    fn validate(&self) -> SyncResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

// ============================================================================
// Tests
// ============================================================================

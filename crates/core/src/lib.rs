//! # Seedsync Core
//!
//! Core types, traits, and error handling for seedsync.
//!
//! This crate provides the foundational building blocks shared by the
//! dataset loaders, the diff engines and the migration patcher:
//!
//! - **Types**: SQL object kinds, table references, object keys
//! - **Traits**: `Validatable` for structural checks on loaded inputs
//! - **Errors**: Unified error handling with `SyncError` and `SyncResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{ResultExt, SyncError, SyncResult};
pub use traits::Validatable;
pub use types::{ObjectKey, SqlObjectType, TableRef};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

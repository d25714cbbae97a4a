//! # Migration Patching
//!
//! This module injects generated SQL into a hand-authored migration source
//! file. The file is treated as plain text with two well-known anchor
//! comments, not parsed as code.
//!
//! ## Generated Regions
//!
//! ```text
//! protected override void Up(MigrationBuilder migrationBuilder)
//! {
//!     // BEGIN SEED DATA (generated)
//!     migrationBuilder.Sql(@"INSERT INTO ...;");
//!
//!     // END SEED DATA (generated)
//!
//!     // BEGIN SQL OBJECTS (generated)
//!     // (no changes)
//!     // END SQL OBJECTS (generated)
//!
//!     ...hand-written migration code...
//! }
//! ```
//!
//! Each region owns the lines between its markers exclusively. Everything
//! outside the regions is left byte-for-byte intact.

pub mod patcher;
pub mod region;

pub use patcher::{DEFAULT_INDENT, UP_SIGNATURES, apply, detect_newline};
pub use region::Region;

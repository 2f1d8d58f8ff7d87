//! Relational snapshot engine for PostgreSQL
//!
//! Provides the pieces of a dependency-ordered schema snapshot pipeline:
//! - Schema introspection (tables, columns, foreign keys, sequences)
//! - Foreign-key-safe table ordering with cycle tolerance
//! - Snapshot export to a portable JSON document
//! - Snapshot import with schema-drift tolerance
//! - Post-import verification of row counts and sequence values
//!
//! The database-facing components take an explicit `tokio_postgres::Client`,
//! so export and import can target different databases within one process
//! and the pure logic (ordering, statement construction, report accounting)
//! stays testable without a server.

pub mod catalog;
pub mod order;
pub mod snapshot;

#[cfg(feature = "postgres")]
pub mod db;
#[cfg(feature = "postgres")]
pub mod export;
#[cfg(feature = "postgres")]
pub mod import;
#[cfg(feature = "postgres")]
pub mod verify;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use catalog::{ColumnInfo, ForeignKey, SchemaCatalog, TableInfo};
pub use order::{DependencyGraph, ExportOrder};
pub use snapshot::{Row, Snapshot, SnapshotMetadata};

#[cfg(feature = "postgres")]
pub use catalog::CatalogError;
#[cfg(feature = "postgres")]
pub use db::{DbConfig, DbError};
#[cfg(feature = "postgres")]
pub use export::{ExportError, SnapshotExporter};
#[cfg(feature = "postgres")]
pub use import::{ImportError, ImportReport, SnapshotImporter, TableOutcome};
#[cfg(feature = "postgres")]
pub use verify::{Check, CheckOutcome, Verifier, VerifyReport};

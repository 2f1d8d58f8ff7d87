//! CLI error types

use thiserror::Error;

/// Errors surfaced to the operator with a non-zero exit status.
///
/// Per-table problems never land here; they are reported inside the
/// import/verify summaries and leave the exit status at zero.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::db::DbError),
    #[error("export failed: {0}")]
    Export(#[from] crate::export::ExportError),
    #[error("import failed: {0}")]
    Import(#[from] crate::import::ImportError),
    #[error("snapshot file error: {0}")]
    Snapshot(#[from] crate::snapshot::SnapshotStoreError),
}

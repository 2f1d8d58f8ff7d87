//! Snapshot file persistence
//!
//! Snapshots always pass through durable storage between export and
//! import; there is no in-memory-only hand-off.

use std::path::Path;

use tracing::info;

use super::Snapshot;

/// Errors reading or writing snapshot files
#[derive(Debug, thiserror::Error)]
pub enum SnapshotStoreError {
    #[error("failed to read snapshot from {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to write snapshot to {path}: {message}")]
    Write { path: String, message: String },
    #[error("snapshot at {path} is not a valid snapshot document: {message}")]
    Parse { path: String, message: String },
}

/// Write a snapshot as pretty-printed JSON, creating parent directories.
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<(), SnapshotStoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| SnapshotStoreError::Write {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }
    }

    let json =
        serde_json::to_string_pretty(snapshot).map_err(|e| SnapshotStoreError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    std::fs::write(path, json).map_err(|e| SnapshotStoreError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    info!(
        path = %path.display(),
        tables = snapshot.data.len(),
        rows = snapshot.total_rows(),
        "Saved snapshot"
    );
    Ok(())
}

/// Load a snapshot document from disk.
pub fn load(path: &Path) -> Result<Snapshot, SnapshotStoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| SnapshotStoreError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| SnapshotStoreError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

//! Snapshot document model
//!
//! The snapshot is the durable artifact between export and import: a
//! self-describing JSON document carrying the export metadata (including
//! the computed table order), per-table sequence values, and per-table row
//! arrays. Rows are order-preserving JSON objects mirroring whatever shape
//! the source tables had; the engine never assumes a compile-time row
//! structure.

pub mod store;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use store::SnapshotStoreError;

/// One exported row: column name -> scalar value, in column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Export metadata, serialized with the document's camelCase field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    /// Export start time (UTC).
    pub exported_at: DateTime<Utc>,
    /// Origin label (e.g. a connection nickname), for operator context.
    pub source: String,
    /// Schema the snapshot was taken from.
    pub schema: String,
    /// Total table count in the source catalog, including empty tables.
    pub table_count: usize,
    /// Dependency-safe processing order; reused verbatim on import and
    /// reversed for pre-import cleanup.
    pub export_order: Vec<String>,
}

/// A full schema snapshot.
///
/// Invariants: `data` keys are a subset of `metadata.export_order`, and
/// every ordered table that had at least one readable row appears in
/// `data`. Consumers never mutate a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub metadata: SnapshotMetadata,
    /// table name -> last sequence value, for tables backed by an
    /// `<table>_id_seq` sequence.
    #[serde(default)]
    pub sequences: BTreeMap<String, i64>,
    /// table name -> exported rows, in the order the store returned them.
    #[serde(default)]
    pub data: BTreeMap<String, Vec<Row>>,
}

impl Snapshot {
    /// Number of rows recorded for a table (0 when absent from `data`).
    pub fn row_count(&self, table: &str) -> usize {
        self.data.get(table).map_or(0, Vec::len)
    }

    /// Total rows across all tables.
    pub fn total_rows(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }

    /// Column names recorded for a table, in snapshot order. Every row of
    /// a table shares one shape, so the first row is authoritative.
    pub fn columns_of(&self, table: &str) -> Vec<String> {
        self.data
            .get(table)
            .and_then(|rows| rows.first())
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut row = Row::new();
        row.insert("id".to_string(), serde_json::json!(1));
        row.insert("name".to_string(), serde_json::json!("A"));

        let mut data = BTreeMap::new();
        data.insert("parent".to_string(), vec![row]);

        let mut sequences = BTreeMap::new();
        sequences.insert("parent".to_string(), 1);

        Snapshot {
            metadata: SnapshotMetadata {
                exported_at: Utc::now(),
                source: "test".to_string(),
                schema: "public".to_string(),
                table_count: 2,
                export_order: vec!["parent".to_string(), "child".to_string()],
            },
            sequences,
            data,
        }
    }

    #[test]
    fn row_counts() {
        let snapshot = sample();
        assert_eq!(snapshot.row_count("parent"), 1);
        assert_eq!(snapshot.row_count("child"), 0);
        assert_eq!(snapshot.total_rows(), 1);
    }

    #[test]
    fn columns_preserve_snapshot_order() {
        let snapshot = sample();
        assert_eq!(snapshot.columns_of("parent"), vec!["id", "name"]);
        assert!(snapshot.columns_of("child").is_empty());
    }
}

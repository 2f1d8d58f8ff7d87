//! Snapshot export
//!
//! Runs the introspector and sequencer, then bulk-reads every table in
//! dependency order. The store itself produces the portable row encoding
//! (`row_to_json`), so timestamps, numerics and uuids arrive in their
//! canonical text forms and the exporter stays schema-agnostic.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio_postgres::Client;
use tracing::{info, warn};

use crate::catalog::{self, CatalogError};
use crate::db::quote_qualified;
use crate::order::DependencyGraph;
use crate::snapshot::{Row, Snapshot, SnapshotMetadata};

/// Errors during export
///
/// Only introspection failures are fatal; individual table or sequence
/// reads that fail are logged and left out of the snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("introspection failed: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, thiserror::Error)]
enum ReadError {
    #[error("query failed: {0}")]
    Query(String),
    #[error("row was not returned as a JSON object")]
    Shape,
}

/// Exports one schema into a [`Snapshot`].
pub struct SnapshotExporter {
    schema: String,
    source: String,
}

impl SnapshotExporter {
    /// Create an exporter for a schema, labelled with an origin name that
    /// is recorded in the snapshot metadata.
    pub fn new(schema: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            source: source.into(),
        }
    }

    /// Export all tables and sequence values. Every call produces a brand
    /// new snapshot; there are no merge semantics.
    pub async fn export(&self, client: &Client) -> Result<Snapshot, ExportError> {
        let started_at = Utc::now();

        let catalog = catalog::introspect(client, &self.schema).await?;
        let graph = DependencyGraph::from_catalog(&catalog);
        for group in graph.cyclic_groups() {
            warn!(
                tables = ?group,
                "circular foreign keys; no insert order is safe for these tables once \
                 constraint enforcement returns"
            );
        }
        let export_order = graph.export_order();

        info!(
            schema = %self.schema,
            tables = export_order.len(),
            "Starting export"
        );

        let mut data: BTreeMap<String, Vec<Row>> = BTreeMap::new();
        for table in &export_order {
            match self.read_rows(client, table).await {
                Ok(rows) => {
                    info!(table = %table, rows = rows.len(), "Exported table");
                    if !rows.is_empty() {
                        data.insert(table.clone(), rows);
                    }
                }
                Err(e) => {
                    // Partial snapshot over abort: the table is left out of
                    // `data` and the export continues.
                    warn!(table = %table, error = %e, "Failed to read table, skipping");
                }
            }
        }

        let mut sequences: BTreeMap<String, i64> = BTreeMap::new();
        for table in &catalog.tables {
            let Some(sequence) = &table.sequence else {
                continue;
            };
            match self.read_sequence(client, sequence).await {
                Ok(value) => {
                    sequences.insert(table.name.clone(), value);
                }
                Err(e) => {
                    warn!(sequence = %sequence, error = %e, "Failed to read sequence value");
                }
            }
        }

        info!(
            tables = data.len(),
            rows = data.values().map(Vec::len).sum::<usize>(),
            sequences = sequences.len(),
            "Export complete"
        );

        Ok(Snapshot {
            metadata: SnapshotMetadata {
                exported_at: started_at,
                source: self.source.clone(),
                schema: self.schema.clone(),
                table_count: catalog.tables.len(),
                export_order,
            },
            sequences,
            data,
        })
    }

    async fn read_rows(&self, client: &Client, table: &str) -> Result<Vec<Row>, ReadError> {
        let sql = format!(
            "SELECT row_to_json(t) FROM {} t",
            quote_qualified(&self.schema, table)
        );
        let rows = client
            .query(sql.as_str(), &[])
            .await
            .map_err(|e| ReadError::Query(e.to_string()))?;

        rows.into_iter()
            .map(|r| {
                let value: serde_json::Value = r.get(0);
                match value {
                    serde_json::Value::Object(map) => Ok(map),
                    _ => Err(ReadError::Shape),
                }
            })
            .collect()
    }

    async fn read_sequence(
        &self,
        client: &Client,
        sequence: &str,
    ) -> Result<i64, tokio_postgres::Error> {
        let sql = format!(
            "SELECT last_value FROM {}",
            quote_qualified(&self.schema, sequence)
        );
        let row = client.query_one(sql.as_str(), &[]).await?;
        Ok(row.get(0))
    }
}

//! Snapshot import
//!
//! Restores a snapshot into a target database as a linear state machine:
//! disable constraint enforcement, clear tables in reverse dependency
//! order, bulk-load them in forward order, restore sequences, re-enable
//! enforcement. Only the initial disable can fail the run; everything
//! after it is collected into the [`ImportReport`] rather than raised, so
//! control always reaches the unconditional re-enable.

mod sql;

use std::collections::HashSet;

use tokio_postgres::Client;
use tokio_postgres::types::ToSql;
use tracing::{debug, error, info, warn};

use crate::db::quote_qualified;
use crate::snapshot::Snapshot;

/// Fatal import errors. Per-table failures are reported, not raised.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to disable integrity enforcement: {0}")]
    IntegrityDisableFailed(String),
    #[error(
        "failed to re-enable integrity enforcement: {0}; \
         the session may be left without constraint checks"
    )]
    IntegrityRestoreFailed(String),
}

/// Outcome of loading one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    /// The snapshot recorded no rows for this table.
    NoData,
    /// No snapshot column still exists in the target table.
    NoMatchingColumns,
    Imported {
        rows: u64,
        /// Snapshot columns absent from the target (schema drift).
        dropped_columns: usize,
    },
    Failed(String),
}

/// Per-table accounting for one import run.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Load outcome per table, in forward export order.
    pub outcomes: Vec<(String, TableOutcome)>,
    /// Tables that could not be cleared, with the cause.
    pub clear_failures: Vec<(String, String)>,
    /// Sequences successfully restored.
    pub sequences_restored: usize,
    /// Sequences that could not be restored, with the cause.
    pub sequence_failures: Vec<(String, String)>,
}

impl ImportReport {
    /// Tables whose load failed outright.
    pub fn error_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, TableOutcome::Failed(_)))
            .count()
    }

    /// Drift and cleanup findings: dropped columns, unmatchable tables,
    /// clear and sequence failures.
    pub fn warning_count(&self) -> usize {
        let outcome_warnings = self
            .outcomes
            .iter()
            .filter(|(_, o)| match o {
                TableOutcome::NoMatchingColumns => true,
                TableOutcome::Imported {
                    dropped_columns, ..
                } => *dropped_columns > 0,
                _ => false,
            })
            .count();
        outcome_warnings + self.clear_failures.len() + self.sequence_failures.len()
    }

    /// Total rows inserted across all tables.
    pub fn rows_imported(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|(_, o)| match o {
                TableOutcome::Imported { rows, .. } => *rows,
                _ => 0,
            })
            .sum()
    }

    /// Tables that were actually populated.
    pub fn tables_imported(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, TableOutcome::Imported { .. }))
            .count()
    }
}

/// Restores a [`Snapshot`] into a target database.
#[derive(Debug, Default)]
pub struct SnapshotImporter;

impl SnapshotImporter {
    pub fn new() -> Self {
        Self
    }

    /// Run the full import state machine against the target.
    ///
    /// Constraint enforcement is re-enabled on every exit path of the
    /// clear/load/sequence steps; a failure to re-enable is surfaced as
    /// [`ImportError::IntegrityRestoreFailed`] because it leaves the
    /// session degraded.
    pub async fn import(
        &self,
        client: &Client,
        snapshot: &Snapshot,
    ) -> Result<ImportReport, ImportError> {
        client
            .batch_execute("SET session_replication_role = replica")
            .await
            .map_err(|e| ImportError::IntegrityDisableFailed(e.to_string()))?;
        info!("Integrity enforcement disabled for this session");

        // Nothing in here returns early: per-table failures land in the
        // report so the re-enable below runs unconditionally.
        let report = self.run(client, snapshot).await;

        let restore = client
            .batch_execute("SET session_replication_role = DEFAULT")
            .await;
        match restore {
            Ok(()) => info!("Integrity enforcement re-enabled"),
            Err(e) => {
                error!("failed to re-enable integrity enforcement: {}", e);
                return Err(ImportError::IntegrityRestoreFailed(e.to_string()));
            }
        }

        info!(
            tables = report.tables_imported(),
            rows = report.rows_imported(),
            sequences = report.sequences_restored,
            errors = report.error_count(),
            warnings = report.warning_count(),
            "Import complete"
        );
        Ok(report)
    }

    async fn run(&self, client: &Client, snapshot: &Snapshot) -> ImportReport {
        let mut report = ImportReport::default();
        let schema = &snapshot.metadata.schema;

        // Clear in reverse dependency order; referencing tables empty out
        // before the tables they point at.
        for table in snapshot.metadata.export_order.iter().rev() {
            match client
                .execute(sql::delete_all(schema, table).as_str(), &[])
                .await
            {
                Ok(deleted) => debug!(table = %table, deleted, "Cleared table"),
                Err(e) => {
                    // Tables missing from the target are expected drift.
                    warn!(table = %table, error = %e, "Failed to clear table");
                    report.clear_failures.push((table.clone(), e.to_string()));
                }
            }
        }

        for table in &snapshot.metadata.export_order {
            let outcome = self.load_table(client, snapshot, table).await;
            match &outcome {
                TableOutcome::NoData => debug!(table = %table, "No data in snapshot"),
                TableOutcome::NoMatchingColumns => {
                    warn!(table = %table, "No snapshot column exists in the target table")
                }
                TableOutcome::Imported {
                    rows,
                    dropped_columns,
                } => info!(table = %table, rows, dropped_columns, "Imported table"),
                TableOutcome::Failed(e) => {
                    warn!(table = %table, error = %e, "Failed to import table")
                }
            }
            report.outcomes.push((table.clone(), outcome));
        }

        for (table, value) in &snapshot.sequences {
            // Sequence discovery is by naming convention, matching export.
            let sequence = quote_qualified(schema, &format!("{}_id_seq", table));
            let params: &[&(dyn ToSql + Sync)] = &[&sequence, value];
            match client
                .query_one("SELECT setval($1::regclass, $2, true)", params)
                .await
            {
                Ok(_) => {
                    debug!(table = %table, value, "Restored sequence");
                    report.sequences_restored += 1;
                }
                Err(e) => {
                    warn!(table = %table, error = %e, "Failed to restore sequence");
                    report
                        .sequence_failures
                        .push((table.clone(), e.to_string()));
                }
            }
        }

        report
    }

    async fn load_table(
        &self,
        client: &Client,
        snapshot: &Snapshot,
        table: &str,
    ) -> TableOutcome {
        let Some(rows) = snapshot.data.get(table) else {
            return TableOutcome::NoData;
        };
        if rows.is_empty() {
            return TableOutcome::NoData;
        }

        let snapshot_columns = snapshot.columns_of(table);
        let target_columns =
            match target_columns(client, &snapshot.metadata.schema, table).await {
                Ok(columns) => columns,
                Err(e) => return TableOutcome::Failed(e),
            };

        let columns = sql::intersect_columns(&snapshot_columns, &target_columns);
        if columns.is_empty() {
            return TableOutcome::NoMatchingColumns;
        }
        let dropped_columns = snapshot_columns.len() - columns.len();

        let payload = match serde_json::to_value(rows) {
            Ok(payload) => payload,
            Err(e) => return TableOutcome::Failed(e.to_string()),
        };
        let statement = sql::bulk_insert(&snapshot.metadata.schema, table, &columns);
        match client.execute(statement.as_str(), &[&payload]).await {
            Ok(rows) => TableOutcome::Imported {
                rows,
                dropped_columns,
            },
            Err(e) => TableOutcome::Failed(e.to_string()),
        }
    }
}

async fn target_columns(
    client: &Client,
    schema: &str,
    table: &str,
) -> Result<HashSet<String>, String> {
    client
        .query(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2",
            &[&schema, &table],
        )
        .await
        .map(|rows| rows.into_iter().map(|r| r.get(0)).collect())
        .map_err(|e| e.to_string())
}

//! Post-import verification
//!
//! Re-queries the target for row counts and sequence values and compares
//! them against what the snapshot recorded. Read-only, safe to run any
//! number of times. Mismatches and missing relations are warnings (schema
//! drift and trigger side effects are expected sources of benign
//! difference); only unexpected query failures are errors.

use tokio_postgres::Client;
use tokio_postgres::error::SqlState;
use tracing::{debug, info, warn};

use crate::db::quote_qualified;
use crate::snapshot::Snapshot;

/// Severity of one verification check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Pass,
    Warning(String),
    Error(String),
}

/// One verification check: a subject (table or sequence) and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub subject: String,
    pub outcome: CheckOutcome,
}

/// Aggregated verification results.
#[derive(Debug, Default)]
pub struct VerifyReport {
    pub checks: Vec<Check>,
}

impl VerifyReport {
    fn push(&mut self, subject: impl Into<String>, outcome: CheckOutcome) {
        self.checks.push(Check {
            subject: subject.into(),
            outcome,
        });
    }

    pub fn pass_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.outcome == CheckOutcome::Pass)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| matches!(c.outcome, CheckOutcome::Warning(_)))
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| matches!(c.outcome, CheckOutcome::Error(_)))
            .count()
    }

    /// A clean pass requires zero warnings and zero errors.
    pub fn is_clean(&self) -> bool {
        self.warning_count() == 0 && self.error_count() == 0
    }
}

/// Compares a restored database against the snapshot it came from.
#[derive(Debug, Default)]
pub struct Verifier;

impl Verifier {
    pub fn new() -> Self {
        Self
    }

    /// Check every ordered table's row count and every recorded sequence
    /// value. Sequence checks pass when the live value is at or beyond the
    /// recorded one (concurrent writers may have advanced it).
    pub async fn verify(&self, client: &Client, snapshot: &Snapshot) -> VerifyReport {
        let mut report = VerifyReport::default();
        let schema = &snapshot.metadata.schema;

        info!(
            schema = %schema,
            tables = snapshot.metadata.export_order.len(),
            "Starting verification"
        );

        for table in &snapshot.metadata.export_order {
            let expected = snapshot.row_count(table) as i64;
            let subject = format!("table {}", table);
            let sql = format!("SELECT COUNT(*) FROM {}", quote_qualified(schema, table));
            match client.query_one(sql.as_str(), &[]).await {
                Ok(row) => {
                    let actual: i64 = row.get(0);
                    if actual == expected {
                        debug!(table = %table, rows = actual, "Row count matches");
                        report.push(subject, CheckOutcome::Pass);
                    } else {
                        warn!(table = %table, expected, actual, "Row count mismatch");
                        report.push(
                            subject,
                            CheckOutcome::Warning(format!(
                                "row count mismatch: snapshot has {}, live table has {}",
                                expected, actual
                            )),
                        );
                    }
                }
                Err(e) if e.code() == Some(&SqlState::UNDEFINED_TABLE) => {
                    warn!(table = %table, "Table missing from target");
                    report.push(
                        subject,
                        CheckOutcome::Warning("table missing from target".to_string()),
                    );
                }
                Err(e) => {
                    report.push(subject, CheckOutcome::Error(e.to_string()));
                }
            }
        }

        for (table, &expected) in &snapshot.sequences {
            let sequence = format!("{}_id_seq", table);
            let subject = format!("sequence {}", sequence);
            let sql = format!(
                "SELECT last_value FROM {}",
                quote_qualified(schema, &sequence)
            );
            match client.query_one(sql.as_str(), &[]).await {
                Ok(row) => {
                    let actual: i64 = row.get(0);
                    if actual >= expected {
                        report.push(subject, CheckOutcome::Pass);
                    } else {
                        warn!(sequence = %sequence, expected, actual, "Sequence regressed");
                        report.push(
                            subject,
                            CheckOutcome::Warning(format!(
                                "sequence regressed: snapshot recorded {}, live value is {}",
                                expected, actual
                            )),
                        );
                    }
                }
                Err(e) if e.code() == Some(&SqlState::UNDEFINED_TABLE) => {
                    report.push(
                        subject,
                        CheckOutcome::Warning("sequence missing from target".to_string()),
                    );
                }
                Err(e) => {
                    report.push(subject, CheckOutcome::Error(e.to_string()));
                }
            }
        }

        info!(
            passes = report.pass_count(),
            warnings = report.warning_count(),
            errors = report.error_count(),
            "Verification complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_report_requires_no_findings() {
        let mut report = VerifyReport::default();
        report.push("table a", CheckOutcome::Pass);
        report.push("table b", CheckOutcome::Pass);
        assert!(report.is_clean());
        assert_eq!(report.pass_count(), 2);
    }

    #[test]
    fn warnings_alone_break_a_clean_pass() {
        let mut report = VerifyReport::default();
        report.push("table a", CheckOutcome::Pass);
        report.push(
            "table b",
            CheckOutcome::Warning("row count mismatch".to_string()),
        );
        assert!(!report.is_clean());
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn errors_are_counted_separately() {
        let mut report = VerifyReport::default();
        report.push("table a", CheckOutcome::Error("connection reset".to_string()));
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 0);
        assert!(!report.is_clean());
    }
}

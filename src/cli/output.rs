//! Output formatting for CLI

use std::path::Path;

use crate::import::{ImportReport, TableOutcome};
use crate::snapshot::Snapshot;
use crate::verify::{CheckOutcome, VerifyReport};

/// Format the summary printed after a successful export.
pub fn format_export_summary(snapshot: &Snapshot, path: &Path) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n✅ Exported schema '{}' ({} table(s), {} row(s), {} sequence(s))\n",
        snapshot.metadata.schema,
        snapshot.metadata.table_count,
        snapshot.total_rows(),
        snapshot.sequences.len()
    ));
    output.push_str(&format!("Snapshot written to: {}\n", path.display()));

    let empty: Vec<&str> = snapshot
        .metadata
        .export_order
        .iter()
        .filter(|t| !snapshot.data.contains_key(*t))
        .map(String::as_str)
        .collect();
    if !empty.is_empty() {
        output.push_str(&format!(
            "Tables without data: {}\n",
            empty.join(", ")
        ));
    }

    output
}

/// Format the per-table report printed after an import.
pub fn format_import_report(report: &ImportReport) -> String {
    let mut output = String::new();

    output.push_str("\nImport results:\n");
    for (table, outcome) in &report.outcomes {
        match outcome {
            TableOutcome::NoData => {
                output.push_str(&format!("  - {}: no data\n", table));
            }
            TableOutcome::NoMatchingColumns => {
                output.push_str(&format!("  - {}: ⚠️  no matching columns\n", table));
            }
            TableOutcome::Imported {
                rows,
                dropped_columns: 0,
            } => {
                output.push_str(&format!("  - {}: {} row(s)\n", table, rows));
            }
            TableOutcome::Imported {
                rows,
                dropped_columns,
            } => {
                output.push_str(&format!(
                    "  - {}: {} row(s), ⚠️  {} column(s) dropped\n",
                    table, rows, dropped_columns
                ));
            }
            TableOutcome::Failed(reason) => {
                output.push_str(&format!("  - {}: ❌ {}\n", table, reason));
            }
        }
    }

    if !report.clear_failures.is_empty() {
        output.push_str("\n⚠️  Tables that could not be cleared:\n");
        for (table, reason) in &report.clear_failures {
            output.push_str(&format!("  - {}: {}\n", table, reason));
        }
    }

    if !report.sequence_failures.is_empty() {
        output.push_str("\n⚠️  Sequences that could not be restored:\n");
        for (table, reason) in &report.sequence_failures {
            output.push_str(&format!("  - {}: {}\n", table, reason));
        }
    }

    output.push_str(&format!(
        "\nImported {} table(s), {} row(s), restored {} sequence(s)\n",
        report.tables_imported(),
        report.rows_imported(),
        report.sequences_restored
    ));
    output.push_str(&format_counts(report.warning_count(), report.error_count()));
    output
}

/// Format the verification report with its pass/warning/error summary.
pub fn format_verify_report(report: &VerifyReport) -> String {
    let mut output = String::new();

    output.push_str("\nVerification results:\n");
    for check in &report.checks {
        match &check.outcome {
            CheckOutcome::Pass => {
                output.push_str(&format!("  - {}: ok\n", check.subject));
            }
            CheckOutcome::Warning(reason) => {
                output.push_str(&format!("  - {}: ⚠️  {}\n", check.subject, reason));
            }
            CheckOutcome::Error(reason) => {
                output.push_str(&format!("  - {}: ❌ {}\n", check.subject, reason));
            }
        }
    }

    output.push_str(&format!("\n{} check(s) passed\n", report.pass_count()));
    output.push_str(&format_counts(report.warning_count(), report.error_count()));
    output
}

fn format_counts(warnings: usize, errors: usize) -> String {
    if warnings == 0 && errors == 0 {
        "✅ All checks passed!\n".to_string()
    } else {
        format!("⚠️  {} warning(s), ❌ {} error(s)\n", warnings, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_report_lists_drift() {
        let report = ImportReport {
            outcomes: vec![
                (
                    "parent".to_string(),
                    TableOutcome::Imported {
                        rows: 2,
                        dropped_columns: 0,
                    },
                ),
                (
                    "child".to_string(),
                    TableOutcome::Imported {
                        rows: 1,
                        dropped_columns: 1,
                    },
                ),
            ],
            ..Default::default()
        };
        let text = format_import_report(&report);
        assert!(text.contains("parent: 2 row(s)"));
        assert!(text.contains("1 column(s) dropped"));
        assert!(text.contains("1 warning(s)"));
    }

    #[test]
    fn clean_verify_report_reads_as_a_pass() {
        let report = VerifyReport::default();
        let text = format_verify_report(&report);
        assert!(text.contains("All checks passed"));
    }
}

//! SQL statement construction for import operations

use crate::db::{quote_ident, quote_qualified};

/// Delete every row of a table.
pub(crate) fn delete_all(schema: &str, table: &str) -> String {
    format!("DELETE FROM {}", quote_qualified(schema, table))
}

/// Bulk insert from a single jsonb parameter holding the row array.
///
/// `jsonb_populate_recordset` lets the target database coerce each JSON
/// scalar into the column's declared type, ignores snapshot keys that no
/// longer exist, and keeps the whole table to one round trip. Only the
/// intersected columns are named, so target-only columns fall back to
/// their defaults.
pub(crate) fn bulk_insert(schema: &str, table: &str, columns: &[String]) -> String {
    let target = quote_qualified(schema, table);
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {target} ({column_list}) \
         SELECT {column_list} FROM jsonb_populate_recordset(NULL::{target}, $1)"
    )
}

/// Columns the snapshot shares with the live target table, in snapshot
/// order. An empty result means the table cannot be populated against the
/// current schema.
pub(crate) fn intersect_columns(
    snapshot_columns: &[String],
    target_columns: &std::collections::HashSet<String>,
) -> Vec<String> {
    snapshot_columns
        .iter()
        .filter(|c| target_columns.contains(*c))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn delete_statement_quotes_identifiers() {
        assert_eq!(
            delete_all("public", "order items"),
            "DELETE FROM \"public\".\"order items\""
        );
    }

    #[test]
    fn bulk_insert_names_columns_on_both_sides() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let sql = bulk_insert("public", "users", &columns);
        assert_eq!(
            sql,
            "INSERT INTO \"public\".\"users\" (\"id\", \"name\") \
             SELECT \"id\", \"name\" FROM jsonb_populate_recordset(NULL::\"public\".\"users\", $1)"
        );
    }

    #[test]
    fn intersection_preserves_snapshot_column_order() {
        let snapshot = vec![
            "id".to_string(),
            "legacy_field".to_string(),
            "name".to_string(),
        ];
        let target: HashSet<String> = ["name", "id", "created_at"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(intersect_columns(&snapshot, &target), vec!["id", "name"]);
    }

    #[test]
    fn intersection_can_be_empty() {
        let snapshot = vec!["a".to_string()];
        let target: HashSet<String> = HashSet::new();
        assert!(intersect_columns(&snapshot, &target).is_empty());
    }
}

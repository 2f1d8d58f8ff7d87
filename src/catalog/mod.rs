//! Schema catalog types and PostgreSQL introspection
//!
//! A [`SchemaCatalog`] is an ephemeral description of one schema read from
//! the live database at export time: its base tables (with columns, in
//! ordinal order), its single-column foreign-key edges, and the sequence
//! backing each table's `id` column where one exists.

#[cfg(feature = "postgres")]
mod introspect;

#[cfg(feature = "postgres")]
pub use introspect::{CatalogError, introspect};

/// A column of a base table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type as reported by the catalog (e.g. `integer`, `text`).
    pub data_type: String,
    pub nullable: bool,
}

/// A base table with its columns and discovered `id` sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnInfo>,
    /// Name of the `<table>_id_seq` sequence, if the table has an `id`
    /// column and a matching sequence relation exists in the schema.
    pub sequence: Option<String>,
}

impl TableInfo {
    /// Whether the table has a column literally named `id`.
    pub fn has_id_column(&self) -> bool {
        self.columns.iter().any(|c| c.name == "id")
    }
}

/// A single-column foreign-key edge within one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

impl ForeignKey {
    /// Self-referencing edges are recorded but ignored for ordering.
    pub fn is_self_referencing(&self) -> bool {
        self.table == self.foreign_table
    }
}

/// One schema's tables and foreign-key edges, read from the live catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCatalog {
    pub schema: String,
    /// Base tables, alphabetically ordered and deduplicated.
    pub tables: Vec<TableInfo>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl SchemaCatalog {
    /// Table names in catalog listing order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_id_column_matches_exact_name() {
        let table = TableInfo {
            name: "products".to_string(),
            columns: vec![
                ColumnInfo {
                    name: "product_id".to_string(),
                    data_type: "integer".to_string(),
                    nullable: false,
                },
                ColumnInfo {
                    name: "name".to_string(),
                    data_type: "text".to_string(),
                    nullable: true,
                },
            ],
            sequence: None,
        };
        assert!(!table.has_id_column());
    }

    #[test]
    fn self_referencing_edge_is_detected() {
        let fk = ForeignKey {
            table: "categories".to_string(),
            column: "parent_id".to_string(),
            foreign_table: "categories".to_string(),
            foreign_column: "id".to_string(),
        };
        assert!(fk.is_self_referencing());
    }

    #[test]
    fn table_lookup_by_name() {
        let catalog = SchemaCatalog {
            schema: "public".to_string(),
            tables: vec![TableInfo {
                name: "orders".to_string(),
                columns: vec![],
                sequence: Some("orders_id_seq".to_string()),
            }],
            foreign_keys: vec![],
        };
        assert!(catalog.table("orders").is_some());
        assert!(catalog.table("missing").is_none());
        assert_eq!(catalog.table_names(), vec!["orders"]);
    }
}

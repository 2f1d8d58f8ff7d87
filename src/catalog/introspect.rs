//! Live catalog queries against PostgreSQL

use std::collections::{HashMap, HashSet};

use tokio_postgres::Client;
use tracing::debug;

use super::{ColumnInfo, ForeignKey, SchemaCatalog, TableInfo};

/// Errors during schema introspection
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("schema '{0}' does not exist")]
    SchemaNotFound(String),
    #[error("catalog query failed: {0}")]
    Query(String),
}

const TABLES_QUERY: &str = "SELECT table_name \
     FROM information_schema.tables \
     WHERE table_schema = $1 AND table_type = 'BASE TABLE' \
     ORDER BY table_name";

const COLUMNS_QUERY: &str = "SELECT table_name, column_name, data_type, is_nullable \
     FROM information_schema.columns \
     WHERE table_schema = $1 \
     ORDER BY table_name, ordinal_position";

// Single-column foreign keys with both endpoints inside the schema.
// Composite keys and cross-schema references are out of contract.
const FOREIGN_KEYS_QUERY: &str = "SELECT src.relname, att.attname, tgt.relname, fatt.attname \
     FROM pg_constraint con \
     JOIN pg_class src ON src.oid = con.conrelid \
     JOIN pg_class tgt ON tgt.oid = con.confrelid \
     JOIN pg_namespace ns ON ns.oid = src.relnamespace \
     JOIN pg_namespace tns ON tns.oid = tgt.relnamespace \
     JOIN pg_attribute att ON att.attrelid = con.conrelid AND att.attnum = con.conkey[1] \
     JOIN pg_attribute fatt ON fatt.attrelid = con.confrelid AND fatt.attnum = con.confkey[1] \
     WHERE con.contype = 'f' \
       AND ns.nspname = $1 \
       AND tns.nspname = $1 \
       AND cardinality(con.conkey) = 1 \
     ORDER BY src.relname, att.attname";

const SEQUENCES_QUERY: &str = "SELECT c.relname \
     FROM pg_class c \
     JOIN pg_namespace n ON n.oid = c.relnamespace \
     WHERE n.nspname = $1 AND c.relkind = 'S'";

/// Read the catalog for one schema from a live database.
///
/// Fails fast when the schema does not exist; a present-but-empty schema
/// yields an empty catalog.
pub async fn introspect(client: &Client, schema: &str) -> Result<SchemaCatalog, CatalogError> {
    let exists = client
        .query_opt(
            "SELECT 1 FROM information_schema.schemata WHERE schema_name = $1",
            &[&schema],
        )
        .await
        .map_err(|e| CatalogError::Query(e.to_string()))?;
    if exists.is_none() {
        return Err(CatalogError::SchemaNotFound(schema.to_string()));
    }

    let table_rows = client
        .query(TABLES_QUERY, &[&schema])
        .await
        .map_err(|e| CatalogError::Query(e.to_string()))?;
    let table_names: Vec<String> = table_rows.into_iter().map(|r| r.get(0)).collect();

    let column_rows = client
        .query(COLUMNS_QUERY, &[&schema])
        .await
        .map_err(|e| CatalogError::Query(e.to_string()))?;
    let mut columns_by_table: HashMap<String, Vec<ColumnInfo>> = HashMap::new();
    for row in column_rows {
        let table: String = row.get(0);
        let nullable: String = row.get(3);
        columns_by_table.entry(table).or_default().push(ColumnInfo {
            name: row.get(1),
            data_type: row.get(2),
            nullable: nullable == "YES",
        });
    }

    let sequence_rows = client
        .query(SEQUENCES_QUERY, &[&schema])
        .await
        .map_err(|e| CatalogError::Query(e.to_string()))?;
    let sequence_names: HashSet<String> =
        sequence_rows.into_iter().map(|r| r.get(0)).collect();

    let fk_rows = client
        .query(FOREIGN_KEYS_QUERY, &[&schema])
        .await
        .map_err(|e| CatalogError::Query(e.to_string()))?;
    let foreign_keys: Vec<ForeignKey> = fk_rows
        .into_iter()
        .map(|r| ForeignKey {
            table: r.get(0),
            column: r.get(1),
            foreign_table: r.get(2),
            foreign_column: r.get(3),
        })
        .collect();

    let tables: Vec<TableInfo> = table_names
        .into_iter()
        .map(|name| {
            let columns = columns_by_table.remove(&name).unwrap_or_default();
            let has_id = columns.iter().any(|c| c.name == "id");
            let candidate = format!("{}_id_seq", name);
            let sequence = (has_id && sequence_names.contains(&candidate)).then_some(candidate);
            TableInfo {
                name,
                columns,
                sequence,
            }
        })
        .collect();

    debug!(
        schema = %schema,
        tables = tables.len(),
        foreign_keys = foreign_keys.len(),
        "Introspected schema"
    );

    Ok(SchemaCatalog {
        schema: schema.to_string(),
        tables,
        foreign_keys,
    })
}

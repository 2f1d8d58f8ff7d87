//! Export command implementation

use std::path::PathBuf;

use crate::cli::commands::resolve_config;
use crate::cli::error::CliError;
use crate::cli::output;
use crate::db;
use crate::export::SnapshotExporter;
use crate::snapshot::store;

/// Arguments for the `export` command
pub struct ExportArgs {
    /// Schema to export
    pub schema: String,
    /// Snapshot file to write
    pub output: PathBuf,
    /// Origin label recorded in the snapshot metadata
    pub source: Option<String>,
    /// Connection string override
    pub database_url: Option<String>,
}

/// Handle the `export` command
pub async fn handle_export(args: &ExportArgs) -> Result<(), CliError> {
    let config = resolve_config(args.database_url.as_deref())?;
    let client = db::connect(&config).await?;

    let source = args.source.as_deref().unwrap_or("relsnap");
    let exporter = SnapshotExporter::new(&args.schema, source);
    let snapshot = exporter.export(&client).await?;

    store::save(&args.output, &snapshot)?;

    println!("{}", output::format_export_summary(&snapshot, &args.output));
    Ok(())
}

//! Import and restore command implementations

use std::path::PathBuf;

use crate::cli::commands::resolve_config;
use crate::cli::error::CliError;
use crate::cli::output;
use crate::db;
use crate::import::SnapshotImporter;
use crate::snapshot::store;
use crate::verify::Verifier;

/// Arguments for the `import` and `restore` commands
pub struct ImportArgs {
    /// Snapshot file to restore
    pub snapshot: PathBuf,
    /// Connection string override
    pub database_url: Option<String>,
}

/// Handle the `import` command
///
/// Per-table failures are printed in the report and do not affect the
/// exit status; only configuration and integrity-state errors do.
pub async fn handle_import(args: &ImportArgs) -> Result<(), CliError> {
    let config = resolve_config(args.database_url.as_deref())?;
    let client = db::connect(&config).await?;

    let snapshot = store::load(&args.snapshot)?;
    println!(
        "Importing snapshot of schema '{}' taken at {} from '{}'",
        snapshot.metadata.schema, snapshot.metadata.exported_at, snapshot.metadata.source
    );

    let importer = SnapshotImporter::new();
    let report = importer.import(&client, &snapshot).await?;

    println!("{}", output::format_import_report(&report));
    Ok(())
}

/// Handle the `restore` command: import, then verify against the same
/// snapshot.
pub async fn handle_restore(args: &ImportArgs) -> Result<(), CliError> {
    let config = resolve_config(args.database_url.as_deref())?;
    let client = db::connect(&config).await?;

    let snapshot = store::load(&args.snapshot)?;
    println!(
        "Restoring snapshot of schema '{}' taken at {} from '{}'",
        snapshot.metadata.schema, snapshot.metadata.exported_at, snapshot.metadata.source
    );

    let importer = SnapshotImporter::new();
    let report = importer.import(&client, &snapshot).await?;
    println!("{}", output::format_import_report(&report));

    let verifier = Verifier::new();
    let verify_report = verifier.verify(&client, &snapshot).await;
    println!("{}", output::format_verify_report(&verify_report));
    Ok(())
}

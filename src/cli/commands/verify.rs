//! Verify command implementation

use std::path::PathBuf;

use crate::cli::commands::resolve_config;
use crate::cli::error::CliError;
use crate::cli::output;
use crate::db;
use crate::snapshot::store;
use crate::verify::Verifier;

/// Arguments for the `verify` command
pub struct VerifyArgs {
    /// Snapshot file to verify against
    pub snapshot: PathBuf,
    /// Connection string override
    pub database_url: Option<String>,
}

/// Handle the `verify` command
pub async fn handle_verify(args: &VerifyArgs) -> Result<(), CliError> {
    let config = resolve_config(args.database_url.as_deref())?;
    let client = db::connect(&config).await?;

    let snapshot = store::load(&args.snapshot)?;
    let verifier = Verifier::new();
    let report = verifier.verify(&client, &snapshot).await;

    println!("{}", output::format_verify_report(&report));
    Ok(())
}

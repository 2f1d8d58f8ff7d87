//! CLI command implementations

pub mod export;
pub mod import;
pub mod verify;

use crate::cli::error::CliError;
use crate::db::DbConfig;

pub use export::{ExportArgs, handle_export};
pub use import::{ImportArgs, handle_import, handle_restore};
pub use verify::{VerifyArgs, handle_verify};

/// Resolve the connection config from a flag or the environment.
pub(crate) fn resolve_config(database_url: Option<&str>) -> Result<DbConfig, CliError> {
    match database_url {
        Some(url) => Ok(DbConfig::new(url)),
        None => Ok(DbConfig::from_env()?),
    }
}

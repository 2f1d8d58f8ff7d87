//! relsnap command line interface

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use relsnap::cli::commands::{
    ExportArgs, ImportArgs, VerifyArgs, handle_export, handle_import, handle_restore,
    handle_verify,
};

#[derive(Parser)]
#[command(
    name = "relsnap",
    version,
    about = "Dependency-ordered snapshot export/import for PostgreSQL schemas"
)]
struct Cli {
    /// Connection string (defaults to the DATABASE_URL environment variable)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a schema into a snapshot file
    Export {
        /// Schema to export
        #[arg(long, default_value = "public")]
        schema: String,
        /// Snapshot file to write
        #[arg(long, short, default_value = "snapshot.json")]
        output: PathBuf,
        /// Origin label recorded in the snapshot metadata
        #[arg(long)]
        source: Option<String>,
    },
    /// Import a snapshot into the target database
    Import {
        /// Snapshot file to restore
        snapshot: PathBuf,
    },
    /// Import a snapshot, then verify the restored database against it
    Restore {
        /// Snapshot file to restore
        snapshot: PathBuf,
    },
    /// Verify a restored database against a snapshot
    Verify {
        /// Snapshot file to verify against
        snapshot: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let database_url = cli.database_url;

    match cli.command {
        Command::Export {
            schema,
            output,
            source,
        } => {
            handle_export(&ExportArgs {
                schema,
                output,
                source,
                database_url,
            })
            .await?
        }
        Command::Import { snapshot } => {
            handle_import(&ImportArgs {
                snapshot,
                database_url,
            })
            .await?
        }
        Command::Restore { snapshot } => {
            handle_restore(&ImportArgs {
                snapshot,
                database_url,
            })
            .await?
        }
        Command::Verify { snapshot } => {
            handle_verify(&VerifyArgs {
                snapshot,
                database_url,
            })
            .await?
        }
    }
    Ok(())
}

//! CLI module for the relsnap binary

pub mod commands;
pub mod error;
pub mod output;

pub use error::CliError;

//! # rever-cli
//!
//! Command-line interface for rever.
//!
//! ## Commands
//!
//! - `rever run --system-name <bigquery|athena|denodo>` - Reconcile catalog
//!   descriptions into one target system
//!
//! ## Configuration
//!
//! Every flag falls back to an environment variable, and a `.env` file in the
//! working directory is loaded first when present:
//!
//! - `SYSTEM_NAME` - Target system
//! - `OVERWRITE_MODE` - `ALL` or `IF_EMPTY` (default)
//! - `PREFIX_FOR_UPDATE` - Marker for agent-written descriptions (default `【QDIC】`)
//! - `QDC_BASE_URL`, `QDC_CLIENT_ID`, `QDC_CLIENT_SECRET` - Catalog API access
//! - `QDC_ASSET_CREATED_BY` - Optional creator filter for root assets
//! - `LOG_LEVEL`, `LOG_FORMAT` - Logging, unless `RUST_LOG` is set

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod commands;

use clap::{Parser, Subcommand};
use rever_core::LogFormat;

/// rever - catalog description reconciliation.
#[derive(Debug, Parser)]
#[command(name = "rever")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Filter directive for the log subscriber.
    #[must_use]
    pub fn log_directive(&self) -> String {
        self.log_level.trim().to_ascii_lowercase()
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile catalog descriptions into a target system.
    Run(Box<commands::run::RunArgs>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_logging_flags_follow_the_subcommand() {
        let cli = Cli::parse_from([
            "rever",
            "run",
            "--system-name",
            "denodo",
            "--qdc-base-url",
            "https://catalog.example.com",
            "--qdc-client-id",
            "id",
            "--qdc-client-secret",
            "secret",
            "--log-level",
            "DEBUG",
            "--log-format",
            "json",
        ]);

        assert_eq!(cli.log_directive(), "debug");
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Run(_)));
    }
}

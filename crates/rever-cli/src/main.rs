//! rever CLI - catalog description reconciliation.
//!
//! The main entry point for the `rever` binary.

use anyhow::Result;
use clap::Parser;

use rever_cli::{Cli, Commands};
use rever_core::init_logging;

fn main() -> Result<()> {
    // .env must be loaded before clap reads environment fallbacks
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.log_format, &cli.log_directive());
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        match cli.command {
            Commands::Run(args) => rever_cli::commands::run::execute(*args).await,
        }
    });

    if let Err(e) = &result {
        tracing::error!("run failed: {e:#}");
    }
    result.map(|_| ())
}

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use folio_catalog::{AuthError, CatalogClientError};
use tracing::debug;

mod commands;
mod config;
mod utils;

use commands::Cli;
use config::Config;
use utils::errors::{format_auth_error, format_catalog_error, format_chain};
use utils::{logger, message};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_logger(cli.verbosity());

    // Print errors and exit with status 1 on failure
    match run(cli) {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            debug!("{e:#}");

            if let Some(explanation) = e
                .downcast_ref::<CatalogClientError>()
                .and_then(format_catalog_error)
            {
                message::error(explanation);
                return ExitCode::from(1);
            }

            if let Some(explanation) = e.downcast_ref::<AuthError>().and_then(format_auth_error) {
                message::error(explanation);
                return ExitCode::from(1);
            }

            message::error(format_chain(&e));
            ExitCode::from(1)
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::parse(cli.config.as_deref())?;
    debug!(catalog_url = ?config.catalog_url, "loaded config");

    let runtime = tokio::runtime::Runtime::new().context("Could not start async runtime")?;
    runtime.block_on(cli.command.handle(config))
}

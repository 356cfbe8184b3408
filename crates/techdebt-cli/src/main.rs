// SPDX-License-Identifier: Apache-2.0

//! Techdebt - track tech debt as labeled GitHub issues.
//!
//! Detects the GitHub repository of the current workspace and creates,
//! lists, comments on, closes and reopens issues carrying the tech debt
//! label.

mod cli;
mod commands;
mod errors;
mod logging;
mod output;
mod prompt;

use anyhow::{Context, Result};
use clap::Parser;
use techdebt_core::load_config;
use tracing::debug;

use crate::cli::{Cli, OutputContext};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let output_ctx = OutputContext::from_cli(cli.output);

    let config = load_config().context("Failed to load configuration")?;
    debug!("Configuration loaded successfully");

    match commands::run(cli.command, output_ctx, config, &cli.workspace).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let formatted = errors::format_error(&e);
            eprintln!("Error: {formatted}");
            Err(e)
        }
    }
}

//! Identity CLI
//!
//! Command-line front end for the identity API:
//! 1. Loads the `[sdk]` table from a TOML config file
//! 2. Resolves the tenant credential (env var, key file, or the file itself)
//! 3. Runs one auth or tenant command through `identity-sdk`
//! 4. Prints the result as JSON on stdout; logs go to stderr

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use identity_sdk::IdentitySdk;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::Command;
use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "identity-cli", version, about = "Identity API command-line client")]
struct Cli {
    /// Config file (falls back to CONFIG_PATH, then ./identity-cli.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // JSON logs on stderr keep stdout clean for command output
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let config_path = Config::resolve_path(cli.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let sdk = IdentitySdk::new(config.sdk).context("invalid [sdk] configuration")?;
    info!(base_url = sdk.client().base_url(), "configuration loaded");

    let command = cli.command.name();
    match commands::execute(&sdk, cli.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(command, error = %err, "command failed");
            eprintln!("{}", serde_json::to_string_pretty(&commands::error_report(&err))?);
            Ok(ExitCode::FAILURE)
        }
    }
}

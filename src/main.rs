//! Relay gateway server
//!
//! Loads `config/gateway.yaml` (or the file named by `--config`), applies
//! environment overrides and serves the OpenAI-compatible API.

#![allow(missing_docs)]

use anyhow::Context;
use clap::Parser;
use relay_gateway::utils::logging::init_logging;
use relay_gateway::{Config, Gateway};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "gateway", version, about = relay_gateway::DESCRIPTION)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "GATEWAY_CONFIG", default_value = "config/gateway.yaml")]
    config: PathBuf,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

async fn load_config(path: &PathBuf) -> anyhow::Result<Config> {
    let config = if path.exists() {
        Config::from_file(path)
            .await
            .with_context(|| format!("failed to load {}", path.display()))?
    } else {
        Config::default()
    };
    config
        .with_overrides(|key| std::env::var(key).ok())
        .context("invalid environment override")
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.config).await?;

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    init_logging(config.logging()).context("failed to initialize logging")?;
    if !cli.config.exists() {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    let gateway = Gateway::new(config).context("failed to build gateway")?;
    gateway.run().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            // Logging may not be up yet
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

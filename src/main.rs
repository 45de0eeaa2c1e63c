//! Ecoscan CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{info, warn};

use ecoscan::cli::{dispatch, handle_error, AppContext, Cli};
use ecoscan::infrastructure::logging::Logger;
use ecoscan::{Config, ConfigLoader};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            handle_error(&err, json);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let _logger = Logger::init(&config.logging)?;
    let ctx = AppContext::build(&config, cli.json).await?;

    tokio::select! {
        result = dispatch(cli.command, &ctx) => result,
        _ = tokio::signal::ctrl_c() => {
            // The in-flight command is dropped; completed writes stay committed.
            warn!("interrupted");
            info!(state = %ctx.orchestrator.state(), "abandoned pipeline");
            anyhow::bail!("Interrupted")
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

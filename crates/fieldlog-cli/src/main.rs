//! fieldlog CLI - sync field logs with a farm server from the terminal.

mod cli;
mod commands;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::resolve_state_path;
use crate::commands::conflicts::run_conflicts;
use crate::commands::refresh::run_refresh;
use crate::commands::status::run_status;
use crate::commands::sync::{run_pull, run_push, run_sync};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,fieldlog=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let state_path = resolve_state_path(cli.state);

    match cli.command {
        Commands::Sync => run_sync(&state_path, cli.host, cli.token).await?,
        Commands::Pull => run_pull(&state_path, cli.host, cli.token).await?,
        Commands::Push { retry_failed } => {
            run_push(&state_path, cli.host, cli.token, retry_failed).await?;
        }
        Commands::Refresh { kind } => {
            run_refresh(&state_path, kind.map(Into::into), cli.host, cli.token).await?;
        }
        Commands::Conflicts { limit, json } => run_conflicts(limit, json, &state_path)?,
        Commands::Status { json } => run_status(json, &state_path)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;

//! logkeep CLI - rotating local log store with background upload

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    output::set_json_mode(cli.json);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            output::print_error_json(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let log_level = match (cli.verbose, config.debug) {
        (0, false) => "warn",
        (0, true) | (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "logkeep={level},logkeep_store={level},logkeep_upload={level}",
                    level = log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Log(args) => log::execute(&config, args).await,
        Commands::Raw(args) => raw::execute(&config, args).await,
        Commands::List { category } => list::execute(&config, category).await,
        Commands::Cleanup { category } => cleanup::execute(&config, category).await,
        Commands::Prepare => prepare::execute(&config).await,
        Commands::Upload => upload::execute(&config).await,
        Commands::Export => export::execute(&config).await,
        Commands::Watch { interval } => watch::execute(&config, interval).await,
    };

    if let Err(e) = result {
        output::print_error_json(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

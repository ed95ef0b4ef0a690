//! `oniongate` operator command line.
//!
//! Loads the TOML configuration, opens the `SQLite` registry and runs one
//! subcommand. Results go to stdout, logs to stderr.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use oniongate_app::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Library crates log through `log`; `init()` bridges those records into tracing.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load {}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };

    match commands::execute(cli.command, &config).await {
        Ok(outcome) => {
            if !outcome.text.is_empty() {
                println!("{}", outcome.text);
            }
            if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

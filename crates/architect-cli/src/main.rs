//! Architect CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod output;

use architect_core::config::{LogFormat, LoggingConfig};
use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(2);
        }
    };
    init_logging(&config.logging);
    config.warn_insecure_defaults();

    if let Err(e) = cli.execute(config).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initialize tracing from the logging section; `RUST_LOG` wins if set.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

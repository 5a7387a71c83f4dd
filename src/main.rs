//! Main entry point for the marian-translate CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marian_translate::cli::commands::{self, Commands};
use marian_translate::TranslatorConfig;

/// OPUS-MT translation service
#[derive(Parser, Debug)]
#[command(name = "marian-translate", version, about, long_about = None)]
struct Args {
    /// JSON configuration file (environment variables are used otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={}", crate_target, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = TranslatorConfig::load(args.config.as_deref())?;

    // Execute command
    match args.command {
        Some(Commands::Serve { host, port }) => {
            commands::handle_serve(config, host, port).await?;
        }
        Some(Commands::Translate { from, to, text }) => {
            commands::handle_translate(config, from, to, text).await?;
        }
        Some(Commands::Languages) => {
            commands::handle_languages(&config)?;
        }
        None => {
            commands::handle_serve(config, None, None).await?;
        }
    }

    Ok(())
}

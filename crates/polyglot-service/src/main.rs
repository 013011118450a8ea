//! # Polyglot CLI
//!
//! Command-line surface over the translation hub: one-shot translation,
//! directory listing, and environment health checks.

use anyhow::Result;
use clap::Parser;

use polyglot_service::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present; real environment variables take precedence.
    #[cfg(debug_assertions)]
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not found or error loading: {}", e);
    }
    #[cfg(not(debug_assertions))]
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Translate(args) => cli::translate(args).await?,
        Commands::Languages(args) => cli::languages(args)?,
        Commands::Doctor(args) => cli::doctor(args).await?,
    }

    Ok(())
}

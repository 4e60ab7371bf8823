//! Kysy CLI entry point.

use anyhow::Result;
use clap::Parser;
use kysy::cli::{commands, Cli, Commands};
use kysy::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("kysy={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings).await?;
        }

        Commands::Ask {
            question,
            thread,
            sources,
        } => {
            commands::run_ask(question, thread, *sources, settings).await?;
        }

        Commands::Chat { thread } => {
            commands::run_chat(thread, settings).await?;
        }

        Commands::Add { text, metadata } => {
            commands::run_add(text, metadata.as_deref(), settings).await?;
        }

        Commands::Ingest { files, metadata } => {
            commands::run_ingest(files, metadata.as_deref(), settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}

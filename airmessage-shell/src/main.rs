//! AirMessage Shell
//!
//! Hosts the client core: loads configuration, builds the application
//! context for the configured platform, wires up chat activations and runs
//! until interrupted.

mod config;
mod diagnostics;

use airmessage_core::{AppContext, Subscription};
use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use diagnostics::Cli;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    diagnostics::init_logging(&cli).context("Failed to initialize logging")?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    // Handle diagnostic commands (non-interactive mode)
    if let Some(command) = &cli.command {
        return diagnostics::handle_diagnostic_command(command, &config).await;
    }

    info!("Starting AirMessage shell...");
    info!("Platform: {}", config.platform.kind);

    let context = AppContext::init(&config.context_config());
    let result = run(&context).await;

    context.shutdown();
    result
}

async fn run(context: &AppContext) -> Result<()> {
    let platform = context.platform();

    // Subscribe before initializing so queued activations are not missed
    let activations = platform
        .chat_activation_emitter()
        .map(|emitter| emitter.subscribe());
    platform.initialize_activations();

    info!("Window focused: {}", platform.has_focus().await);
    for (key, value) in platform.extra_email_details().await {
        info!("{}: {}", key, value);
    }

    match activations {
        Some(activations) => watch_activations(context, activations).await,
        None => {
            info!("Chat activations are not supported on this platform");
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")
        }
    }
}

async fn watch_activations(
    context: &AppContext,
    mut activations: Subscription<String>,
) -> Result<()> {
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                return signal.context("Failed to listen for shutdown signal");
            }
            activation = activations.recv() => match activation {
                Some(chat_guid) => {
                    info!(
                        "Chat activation requested: {} ({} conversations cached)",
                        chat_guid,
                        context.message_cache().len()
                    );
                }
                None => {
                    warn!("Activation emitter closed");
                    return Ok(());
                }
            }
        }
    }
}

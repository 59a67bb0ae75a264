//! Minecraft status relay.
//!
//! Watches a Minecraft server and announces confirmed up/down transitions
//! to a Discord text channel.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────┐
//!                  │                  STATUS RELAY                    │
//!                  │                                                  │
//!   Status API ◀───┼── probe ◀── health::PollLoop ──┐                 │
//!                  │              (flap filter)     │                 │
//!                  │                                ▼                 │
//!   Webhook push ──┼─▶ http (Bearer auth) ───▶ discord::Notifier ─────┼──▶ Discord channel
//!                  │                                                  │
//!   Slash command ─┼─▶ discord::Gateway ─▶ commands ─▶ probe          │
//!                  │                                                  │
//!                  │  config · observability · lifecycle              │
//!                  └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use status_relay::config::{load_config, ObservabilityConfig};
use status_relay::lifecycle::{self, signals, Shutdown};
use status_relay::observability::logging;

#[derive(Parser)]
#[command(name = "status-relay", version, about = "Minecraft status relay for Discord")]
struct Args {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long, env = "STATUS_RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "status-relay starting");
    tracing::info!(
        target_address = %format!("{}:{}", config.target.host, config.target.port),
        interval_ms = config.monitor.interval_ms,
        stability_threshold = config.monitor.stability_threshold,
        webhook = %config.webhook.bind_address,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    match lifecycle::run(config, shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Relay stopped with an error");
            ExitCode::FAILURE
        }
    }
}

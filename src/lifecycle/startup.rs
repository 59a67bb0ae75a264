//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Verify the chat login before anything is spawned
//! - Start background tasks (poll loop, gateway) and the webhook listener
//! - Drain background tasks once shutdown is triggered
//!
//! # Design Decisions
//! - Fail fast: a rejected chat login is fatal
//! - The webhook listener starts last

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use crate::commands::{CommandContext, CommandRegistry, MachineAccess};
use crate::config::RelayConfig;
use crate::discord::{DiscordClient, DiscordError, DiscordNotifier, Gateway, Notifier};
use crate::health::PollLoop;
use crate::http::{AppState, WebhookServer};
use crate::lifecycle::Shutdown;
use crate::net::tls::load_tls_config;
use crate::observability::metrics;
use crate::probe::{HttpMachineProbe, McStatusProbe, ProbeError, ServerAddress, StatusProbe};

/// Errors that abort the relay.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("chat login failed: {0}")]
    Login(#[source] DiscordError),

    #[error("failed to build probe: {0}")]
    Probe(#[from] ProbeError),

    #[error("invalid address {0}")]
    Address(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS setup failed: {0}")]
    Tls(#[source] std::io::Error),

    #[error("HTTP server error: {0}")]
    Server(#[source] std::io::Error),
}

/// Run the relay until `shutdown` is triggered.
pub async fn run(config: RelayConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr = parse_addr(&config.observability.metrics_address)?;
        metrics::init_metrics(addr);
    }

    tracing::info!("Logging in...");
    let client = DiscordClient::new(&config.discord).map_err(StartupError::Login)?;
    let user = client.current_user().await.map_err(StartupError::Login)?;
    tracing::info!(user = %user.tag(), "Bot is online");

    let address = ServerAddress::new(config.target.host.clone(), config.target.port);
    let probe: Arc<dyn StatusProbe> = Arc::new(McStatusProbe::new(
        &config.target.api_base,
        Duration::from_millis(config.monitor.probe_timeout_ms),
    )?);
    let notifier: Arc<dyn Notifier> = Arc::new(DiscordNotifier::new(
        client.clone(),
        config.discord.guild_id.clone(),
        config.discord.channel_name.clone(),
    ));

    let mut tasks = JoinSet::new();

    let monitor = if config.monitor.enabled {
        let poll = PollLoop::new(address.clone(), probe.clone(), notifier.clone(), &config.monitor);
        let rx = poll.subscribe();
        tasks.spawn(poll.run(shutdown.subscribe()));
        Some(rx)
    } else {
        tracing::info!("Server monitor disabled");
        None
    };

    let machine = match &config.machine.url {
        Some(url) => Some(MachineAccess {
            probe: Arc::new(HttpMachineProbe::new(
                url,
                Duration::from_secs(config.machine.timeout_secs),
            )?),
            token: config.machine.token.clone(),
        }),
        None => None,
    };
    let registry = Arc::new(CommandRegistry::standard(machine.is_some()));
    let context = Arc::new(CommandContext {
        address,
        probe,
        machine,
    });
    let gateway = Gateway::new(client, config.discord.gateway_url.clone(), registry, context);
    tasks.spawn(gateway.run(shutdown.subscribe()));

    let result = if config.webhook.enabled {
        serve_webhook(&config, notifier, monitor, &shutdown).await
    } else {
        let mut rx = shutdown.subscribe();
        let _ = rx.recv().await;
        Ok(())
    };

    shutdown.trigger();
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "Background task failed");
        }
    }

    result
}

async fn serve_webhook(
    config: &RelayConfig,
    notifier: Arc<dyn Notifier>,
    monitor: Option<tokio::sync::watch::Receiver<crate::health::ConfirmationState>>,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    let mut state = AppState::new(notifier, &config.webhook.secret);
    if let Some(rx) = monitor {
        state = state.with_monitor(rx);
    }
    let server = WebhookServer::new(state, &config.webhook);
    let addr = parse_addr(&config.webhook.bind_address)?;

    match &config.webhook.tls {
        Some(tls) => {
            let tls = load_tls_config(tls).await.map_err(StartupError::Tls)?;
            server
                .run_tls(addr, tls, shutdown.subscribe())
                .await
                .map_err(StartupError::Server)
        }
        None => {
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|source| StartupError::Bind { addr, source })?;
            server
                .run(listener, shutdown.subscribe())
                .await
                .map_err(StartupError::Server)
        }
    }
}

fn parse_addr(value: &str) -> Result<SocketAddr, StartupError> {
    value
        .parse()
        .map_err(|_| StartupError::Address(value.to_string()))
}

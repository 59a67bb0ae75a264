//! Gateway session handling.
//!
//! # Responsibilities
//! - Open the websocket session and identify
//! - Keep the session alive with heartbeats
//! - Route slash-command interactions to the command table
//!
//! # Data Flow
//! ```text
//! Hello(op 10) → Identify(op 2) → Heartbeat(op 1)/ACK(op 11) ...
//! Dispatch(op 0, INTERACTION_CREATE)
//!     → deferred callback
//!     → CommandRegistry::dispatch (own task)
//!     → edit original response
//! ```
//!
//! # Design Decisions
//! - No session resume: any disconnect re-identifies after a fixed delay
//! - Each interaction runs in its own task so a slow probe never blocks
//!   heartbeats or other commands

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::commands::{CommandContext, CommandRegistry, REPLY_FAILED};
use crate::discord::client::DiscordClient;
use crate::discord::types::{
    opcode, DiscordError, DiscordResult, GatewayPayload, Hello, Interaction, InteractionResponse,
    Ready, APPLICATION_COMMAND, INTENT_GUILDS,
};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Long-running gateway connection that answers slash commands.
pub struct Gateway {
    client: DiscordClient,
    url: String,
    registry: Arc<CommandRegistry>,
    context: Arc<CommandContext>,
    reconnect_delay: Duration,
}

impl Gateway {
    pub fn new(
        client: DiscordClient,
        url: impl Into<String>,
        registry: Arc<CommandRegistry>,
        context: Arc<CommandContext>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            registry,
            context,
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Keep a session open until shutdown, reconnecting as needed.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                result = self.session() => match result {
                    Ok(()) => tracing::info!("Gateway session closed, reconnecting"),
                    Err(e) => tracing::warn!(error = %e, "Gateway session failed, reconnecting"),
                },
                _ = shutdown.recv() => break,
            }

            tokio::select! {
                _ = time::sleep(self.reconnect_delay) => {}
                _ = shutdown.recv() => break,
            }
        }
        tracing::info!("Gateway received shutdown signal, exiting loop");
    }

    /// Run one session. `Ok` means the server asked us to reconnect or closed cleanly.
    async fn session(&self) -> DiscordResult<()> {
        let (socket, _) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
        let (mut sink, mut stream) = socket.split();

        let hello = loop {
            match stream.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    let payload: GatewayPayload = serde_json::from_str(&text)?;
                    if payload.op != opcode::HELLO {
                        return Err(DiscordError::Gateway(format!(
                            "expected hello, got op {}",
                            payload.op
                        )));
                    }
                    break serde_json::from_value::<Hello>(payload.d.unwrap_or(Value::Null))?;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Err(DiscordError::Gateway("closed before hello".into())),
            }
        };

        sink.send(frame(opcode::IDENTIFY, Some(self.identify())))
            .await?;

        let mut heartbeat = time::interval(Duration::from_millis(hello.heartbeat_interval.max(1)));
        heartbeat.tick().await;
        let mut sequence: Option<u64> = None;
        let mut acknowledged = true;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if !acknowledged {
                        return Err(DiscordError::Gateway("heartbeat not acknowledged".into()));
                    }
                    acknowledged = false;
                    sink.send(frame(opcode::HEARTBEAT, Some(json!(sequence)))).await?;
                }
                message = stream.next() => {
                    let text = match message {
                        Some(Ok(WsMessage::Text(text))) => text,
                        Some(Ok(WsMessage::Close(close))) => {
                            tracing::info!(frame = ?close, "Gateway closed the connection");
                            return Ok(());
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(()),
                    };

                    let payload: GatewayPayload = serde_json::from_str(&text)?;
                    if payload.s.is_some() {
                        sequence = payload.s;
                    }

                    match payload.op {
                        opcode::DISPATCH => self.dispatch(payload),
                        opcode::HEARTBEAT => {
                            sink.send(frame(opcode::HEARTBEAT, Some(json!(sequence)))).await?;
                        }
                        opcode::HEARTBEAT_ACK => acknowledged = true,
                        opcode::RECONNECT => return Ok(()),
                        opcode::INVALID_SESSION => {
                            return Err(DiscordError::Gateway("invalid session".into()));
                        }
                        other => tracing::debug!(op = other, "Ignoring gateway opcode"),
                    }
                }
            }
        }
    }

    fn identify(&self) -> Value {
        json!({
            "token": self.client.token(),
            "intents": INTENT_GUILDS,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "status-relay",
                "device": "status-relay",
            },
        })
    }

    fn dispatch(&self, payload: GatewayPayload) {
        let data = payload.d.unwrap_or(Value::Null);
        match payload.t.as_deref() {
            Some("READY") => match serde_json::from_value::<Ready>(data) {
                Ok(ready) => tracing::info!(user = %ready.user.tag(), "Logged in to gateway"),
                Err(e) => tracing::warn!(error = %e, "Unreadable READY payload"),
            },
            Some("INTERACTION_CREATE") => match serde_json::from_value::<Interaction>(data) {
                Ok(interaction) if interaction.kind == APPLICATION_COMMAND => {
                    let client = self.client.clone();
                    let registry = self.registry.clone();
                    let context = self.context.clone();
                    tokio::spawn(async move {
                        handle_interaction(&client, &registry, &context, interaction).await;
                    });
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Unreadable interaction payload"),
            },
            _ => {}
        }
    }
}

fn frame(op: u8, d: Option<Value>) -> WsMessage {
    let payload = GatewayPayload { op, d, s: None, t: None };
    // Serializing a struct of plain values cannot fail.
    WsMessage::Text(serde_json::to_string(&payload).unwrap_or_default().into())
}

/// Acknowledge, run, and answer one slash command.
pub async fn handle_interaction(
    client: &DiscordClient,
    registry: &CommandRegistry,
    context: &CommandContext,
    interaction: Interaction,
) {
    let name = interaction
        .data
        .as_ref()
        .map(|d| d.name.as_str())
        .unwrap_or_default();

    if let Err(e) = client
        .create_interaction_response(&interaction.id, &interaction.token, &InteractionResponse::deferred())
        .await
    {
        tracing::error!(command = %name, error = %e, "Failed to acknowledge interaction");
        return;
    }

    let reply = registry.dispatch(name, context).await;

    let Err(e) = client
        .edit_original_response(&interaction.application_id, &interaction.token, &reply)
        .await
    else {
        return;
    };
    tracing::error!(command = %name, error = %e, "Failed to send command reply");

    // Replace the deferred placeholder so the caller is not left waiting.
    if let Err(e) = client
        .edit_original_response(&interaction.application_id, &interaction.token, REPLY_FAILED)
        .await
    {
        tracing::error!(command = %name, error = %e, "Failed to send fallback reply");
    }
}

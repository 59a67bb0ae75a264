//! Discord API models and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Channel type for a guild text channel.
pub const GUILD_TEXT: u8 = 0;

/// Interaction type for slash commands.
pub const APPLICATION_COMMAND: u8 = 2;

/// Callback type: acknowledge now, edit the response later.
pub const DEFERRED_CHANNEL_MESSAGE: u8 = 5;

/// Gateway intent bit for guild events.
pub const INTENT_GUILDS: u64 = 1;

/// Errors that can occur while talking to Discord.
#[derive(Debug, Error)]
pub enum DiscordError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Discord API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The bot has not joined any guild yet.
    #[error("bot is not a member of any guild")]
    NoGuild,

    /// Command registration needs the application id.
    #[error("application id is not configured")]
    MissingApplicationId,

    /// Websocket transport failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A gateway frame could not be decoded.
    #[error("invalid gateway payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The gateway session ended abnormally.
    #[error("gateway session error: {0}")]
    Gateway(String),
}

/// Result type alias for Discord operations.
pub type DiscordResult<T> = Result<T, DiscordError>;

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
}

impl CurrentUser {
    /// `name#1234` for legacy accounts, plain `name` otherwise.
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if d != "0" => format!("{}#{}", self.username, d),
            _ => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Guild {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: Option<String>,
}

impl Channel {
    pub fn is_text_named(&self, name: &str) -> bool {
        self.kind == GUILD_TEXT && self.name.as_deref() == Some(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationCommand {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub application_id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub token: String,
    #[serde(default)]
    pub data: Option<InteractionData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionData {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
}

impl InteractionResponse {
    pub fn deferred() -> Self {
        Self {
            kind: DEFERRED_CHANNEL_MESSAGE,
        }
    }
}

/// Envelope of every gateway frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hello {
    pub heartbeat_interval: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ready {
    pub user: CurrentUser,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Gateway opcodes used by the relay.
pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

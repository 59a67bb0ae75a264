//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the status relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Chat backend credentials and destination.
    pub discord: DiscordConfig,

    /// The monitored game server.
    pub target: TargetConfig,

    /// Poll loop and debounce settings.
    pub monitor: MonitorConfig,

    /// Inbound status webhook.
    pub webhook: WebhookConfig,

    /// Optional host machine status endpoint.
    pub machine: MachineConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chat backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token used for REST and gateway authentication.
    pub token: String,

    /// Application id, required for command registration.
    pub application_id: Option<String>,

    /// Guild to post into. Defaults to the first guild the bot is in.
    pub guild_id: Option<String>,

    /// Name of the text channel that receives status messages.
    pub channel_name: String,

    /// REST API base URL.
    pub api_base: String,

    /// Gateway websocket URL.
    pub gateway_url: String,

    /// Timeout for REST calls in seconds.
    pub request_timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            application_id: None,
            guild_id: None,
            channel_name: "minecraft".to_string(),
            api_base: "https://discord.com/api/v10".to_string(),
            gateway_url: "wss://gateway.discord.gg/?v=10&encoding=json".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Monitored game server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Server host name or IP.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Base URL of the status API.
    pub api_base: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 25565,
            api_base: "https://api.mcstatus.io".to_string(),
        }
    }
}

/// Poll loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Enable the poll loop.
    pub enabled: bool,

    /// Poll interval in milliseconds.
    pub interval_ms: u64,

    /// Consecutive agreeing samples required to confirm a transition.
    pub stability_threshold: u32,

    /// Upper bound for a single probe call in milliseconds.
    pub probe_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 5000,
            stability_threshold: 2,
            probe_timeout_ms: 4000,
        }
    }
}

/// Inbound webhook configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Enable the HTTP listener.
    pub enabled: bool,

    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Shared secret expected as a Bearer token.
    pub secret: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:3000".to_string(),
            secret: String::new(),
            request_timeout_secs: 15,
            max_body_bytes: 64 * 1024,
            tls: None,
        }
    }
}

/// TLS configuration for the webhook listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Host machine status endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Status endpoint URL. The machine command is only offered when set.
    pub url: Option<String>,

    /// Bearer token for the status endpoint.
    pub token: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

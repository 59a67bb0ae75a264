//! Configuration loading from disk and environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, merge and validate configuration.
///
/// Sources in increasing precedence: defaults, the optional TOML file,
/// a `.env` file in the working directory, and the process environment.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => RelayConfig::default(),
    };

    if let Ok(env_file) = dotenvy::dotenv() {
        tracing::debug!(path = %env_file.display(), "Loaded .env file");
    }
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML document into a configuration without validating it.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so callers and tests can supply their own.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup("DISCORD_BOT_TOKEN") {
        config.discord.token = token;
    }
    if let Some(id) = lookup("DISCORD_CLIENT_ID") {
        config.discord.application_id = Some(id);
    }
    if let Some(id) = lookup("DISCORD_GUILD_ID") {
        config.discord.guild_id = Some(id);
    }
    if let Some(host) = lookup("MINECRAFT_SERVER_IP") {
        config.target.host = host;
    }
    if let Some(port) = lookup("MINECRAFT_SERVER_PORT") {
        config.target.port = parse_env("MINECRAFT_SERVER_PORT", &port)?;
    }
    if let Some(port) = lookup("STATUS_PORT") {
        let port: u16 = parse_env("STATUS_PORT", &port)?;
        let mut addr = config
            .webhook
            .bind_address
            .parse::<SocketAddr>()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 0)));
        addr.set_port(port);
        config.webhook.bind_address = addr.to_string();
    }
    if let Some(secret) = lookup("STATUS_SECRET") {
        config.webhook.secret = secret;
    }
    if let Some(token) = lookup("STATUS_SERVER_TOKEN") {
        config.machine.token = Some(token);
    }
    if let Some(url) = lookup("STATUS_SERVER_URL") {
        config.machine.url = Some(url);
    }
    if let Some(interval) = lookup("POLL_INTERVAL_MS") {
        config.monitor.interval_ms = parse_env("POLL_INTERVAL_MS", &interval)?;
    }
    match lookup("PROBE_TIMEOUT_MS") {
        Some(timeout) => {
            config.monitor.probe_timeout_ms = parse_env("PROBE_TIMEOUT_MS", &timeout)?;
        }
        // A shorter interval pulls the timeout inside it.
        None if config.monitor.interval_ms > 1 => {
            config.monitor.probe_timeout_ms = config
                .monitor
                .probe_timeout_ms
                .min(config.monitor.interval_ms - 1);
        }
        None => {}
    }
    if let Some(threshold) = lookup("STABILITY_THRESHOLD") {
        config.monitor.stability_threshold = parse_env("STABILITY_THRESHOLD", &threshold)?;
    }
    Ok(())
}

fn parse_env<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key,
        value: value.to_string(),
    })
}

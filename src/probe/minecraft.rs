//! Game server status client backed by the mcstatus.io HTTP API.
//!
//! # Responsibilities
//! - Query `GET {api_base}/v2/status/java/{host}:{port}`
//! - Translate the API's snake_case payload into a `LivenessResult`
//!
//! # Design Decisions
//! - A non-2xx answer from the API means "not live", not a probe failure
//! - Transport and decode errors surface as `ProbeError`; the poll loop counts
//!   them as down samples and `StatusProbe::check` collapses them for commands
//! - A request that runs out of time is `ProbeError::Timeout`, which the poll
//!   loop skips

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::probe::types::{LivenessResult, Player, Players, ProbeError, ServerAddress};
use crate::probe::StatusProbe;

/// Status probe for Java edition servers.
#[derive(Debug, Clone)]
pub struct McStatusProbe {
    client: Client,
    api_base: String,
    timeout: Duration,
}

impl McStatusProbe {
    /// Create a probe against `api_base` with a per-request timeout.
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("status-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn classify_error(&self, error: reqwest::Error) -> ProbeError {
        if error.is_timeout() {
            ProbeError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ProbeError::Transport(error)
        }
    }

    fn status_url(&self, address: &ServerAddress) -> String {
        format!("{}/v2/status/java/{}", self.api_base, address)
    }
}

#[async_trait]
impl StatusProbe for McStatusProbe {
    async fn query(&self, address: &ServerAddress) -> Result<LivenessResult, ProbeError> {
        let response = self
            .client
            .get(self.status_url(address))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(address = %address, status = %status, "Status API returned non-success");
            return Ok(LivenessResult::offline());
        }

        let wire: WireStatus = response
            .json()
            .await
            .map_err(|e| match self.classify_error(e) {
                ProbeError::Transport(e) => ProbeError::Payload(e.to_string()),
                other => other,
            })?;

        Ok(wire.into())
    }
}

#[derive(Debug, Deserialize)]
struct WireStatus {
    #[serde(default)]
    online: bool,
    #[serde(default)]
    eula_blocked: Option<bool>,
    #[serde(default)]
    retrieved_at: Option<i64>,
    #[serde(default)]
    srv_record: Option<WireSrvRecord>,
    #[serde(default)]
    version: Option<WireVersion>,
    #[serde(default)]
    players: Option<WirePlayers>,
    #[serde(default)]
    motd: Option<WireMotd>,
    #[serde(default)]
    software: Option<String>,
    #[serde(default)]
    mods: Option<Vec<WireNamed>>,
    #[serde(default)]
    plugins: Option<Vec<WireNamed>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireSrvRecord {
    Target { host: String, port: u16 },
    Text(String),
}

#[derive(Debug, Deserialize)]
struct WireVersion {
    name_clean: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WirePlayers {
    #[serde(default)]
    online: u32,
    #[serde(default)]
    max: u32,
    #[serde(default)]
    list: Vec<WirePlayer>,
}

#[derive(Debug, Deserialize)]
struct WirePlayer {
    name_clean: String,
}

#[derive(Debug, Deserialize)]
struct WireMotd {
    clean: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireNamed {
    Entry { name: String, version: Option<String> },
    Name(String),
}

impl WireNamed {
    fn label(self) -> String {
        match self {
            WireNamed::Entry { name, version: Some(version) } => format!("{name} {version}"),
            WireNamed::Entry { name, version: None } => name,
            WireNamed::Name(name) => name,
        }
    }
}

impl From<WireStatus> for LivenessResult {
    fn from(wire: WireStatus) -> Self {
        LivenessResult {
            online: wire.online,
            players: wire.players.map(|p| Players {
                online: p.online,
                max: p.max,
                list: p
                    .list
                    .into_iter()
                    .map(|player| Player { name: player.name_clean })
                    .collect(),
            }),
            motd: wire.motd.and_then(|m| m.clean),
            version: wire.version.and_then(|v| v.name_clean),
            software: wire.software,
            mods: wire
                .mods
                .unwrap_or_default()
                .into_iter()
                .map(WireNamed::label)
                .collect(),
            plugins: wire
                .plugins
                .unwrap_or_default()
                .into_iter()
                .map(WireNamed::label)
                .collect(),
            eula_blocked: wire.eula_blocked,
            srv_record: wire.srv_record.map(|record| match record {
                WireSrvRecord::Target { host, port } => format!("{host}:{port}"),
                WireSrvRecord::Text(text) => text,
            }),
            retrieved_at: wire.retrieved_at.and_then(DateTime::<Utc>::from_timestamp_millis),
        }
    }
}

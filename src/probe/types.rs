//! Probe result types and error definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Address of the monitored game server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Liveness and metadata for a game server at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LivenessResult {
    pub online: bool,
    pub players: Option<Players>,
    pub motd: Option<String>,
    pub version: Option<String>,
    pub software: Option<String>,
    pub mods: Vec<String>,
    pub plugins: Vec<String>,
    pub eula_blocked: Option<bool>,
    pub srv_record: Option<String>,
    pub retrieved_at: Option<DateTime<Utc>>,
}

impl LivenessResult {
    /// The result every failure collapses to.
    pub fn offline() -> Self {
        Self::default()
    }
}

/// Player counts and the sampled player list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Players {
    pub online: u32,
    pub max: u32,
    pub list: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
}

/// Host machine metrics reported by the machine status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineStatus {
    pub server_status: String,
    pub server_uptime: String,
    pub server_data: MachineInfo,
    pub data: ResourceUsage,
    pub network: NetworkStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineInfo {
    pub server_name: String,
    pub server_cpu: String,
    pub server_os: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub cpu_percentage: f64,
    /// Used memory in GB.
    pub memory: f64,
    /// Total memory in GB.
    pub total_memory: f64,
    pub memory_percentage: f64,
    pub temps: Temperatures,
}

/// Temperatures in degrees Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperatures {
    pub motherboard_temp: f64,
    pub cpu_temp: f64,
    pub gpu_temp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStatus {
    #[serde(default)]
    pub public_ip: Option<String>,
    pub ping_ms: f64,
    pub speed_download_mbps: f64,
    pub speed_upload_mbps: f64,
    #[serde(default)]
    pub interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub ip: String,
}

/// Errors that can occur while probing.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Connection or request failed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The status API answered with something we could not read.
    #[error("invalid response payload: {0}")]
    Payload(String),

    /// The probe did not answer in time.
    #[error("probe timed out after {0}ms")]
    Timeout(u64),
}

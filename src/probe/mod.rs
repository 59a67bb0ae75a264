//! Status probing subsystem.
//!
//! # Data Flow
//! ```text
//! Poll loop tick / command
//!     → StatusProbe::query (minecraft.rs, HTTP status API)
//!     → LivenessResult
//!
//! machine-detail command
//!     → MachineProbe::fetch (machine.rs, Bearer-authenticated endpoint)
//!     → Option<MachineStatus>
//! ```
//!
//! # Design Decisions
//! - Probes are traits so the poll loop and commands can be tested with stubs
//! - `check` is the never-failing boundary: any error becomes "offline"
//! - Probes never cache; every call is a fresh request

pub mod machine;
pub mod minecraft;
pub mod types;

use async_trait::async_trait;

pub use machine::HttpMachineProbe;
pub use minecraft::McStatusProbe;
pub use types::{LivenessResult, MachineStatus, ProbeError, ServerAddress};

/// Liveness source for a game server.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    /// Query the server, reporting transport or decode failures.
    async fn query(&self, address: &ServerAddress) -> Result<LivenessResult, ProbeError>;

    /// Query the server, collapsing every failure into an offline result.
    async fn check(&self, address: &ServerAddress) -> LivenessResult {
        match self.query(address).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Status probe failed");
                LivenessResult::offline()
            }
        }
    }
}

/// Source of host machine metrics.
#[async_trait]
pub trait MachineProbe: Send + Sync {
    /// Fetch metrics, or `None` on any failure.
    async fn fetch(&self, token: &str) -> Option<MachineStatus>;
}

//! Server liveness state machine with flap suppression.
//!
//! # States
//! Two tracks, each `Unknown | Up | Down`:
//! - observed: classification of the most recent sample
//! - confirmed: last state that was announced
//!
//! # State Transitions
//! ```text
//! sample == observed  → consecutive += 1
//! sample != observed  → observed = sample, consecutive = 1
//! sample != confirmed && consecutive >= threshold → confirmed = sample (emit)
//! ```
//!
//! # Design Decisions
//! - Both tracks start `Unknown` so the first sample alone never confirms
//!   (unless the threshold is configured as 1)
//! - Confirmation is never rolled back, even if delivery later fails
//! - One filter per monitored server; no shared global state

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Default number of consecutive agreeing samples needed to confirm.
pub const STABILITY_THRESHOLD: u32 = 2;

/// Announcement posted when the server is confirmed up.
pub const ONLINE_MESSAGE: &str = "🟢 Minecraft server is now **online**!\n";

/// Announcement posted when the server is confirmed down.
pub const OFFLINE_MESSAGE: &str = "🔴 Minecraft server is now **offline**!\n";

/// Classification of the monitored server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerState {
    #[default]
    Unknown,
    Up,
    Down,
}

impl ServerState {
    /// Fixed chat message announcing this state, if it is announceable.
    pub fn announcement(self) -> Option<&'static str> {
        match self {
            ServerState::Up => Some(ONLINE_MESSAGE),
            ServerState::Down => Some(OFFLINE_MESSAGE),
            ServerState::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServerState::Unknown => "unknown",
            ServerState::Up => "up",
            ServerState::Down => "down",
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw liveness reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessSample {
    pub is_up: bool,
    pub observed_at: DateTime<Utc>,
}

impl LivenessSample {
    pub fn new(is_up: bool) -> Self {
        Self {
            is_up,
            observed_at: Utc::now(),
        }
    }

    pub fn classify(&self) -> ServerState {
        if self.is_up {
            ServerState::Up
        } else {
            ServerState::Down
        }
    }
}

/// Debounce bookkeeping for one monitored server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConfirmationState {
    pub last_observed: ServerState,
    pub last_confirmed: ServerState,
    pub consecutive: u32,
}

/// A confirmed change of the server's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ServerState,
    pub to: ServerState,
    pub observed_at: DateTime<Utc>,
}

/// Converts raw samples into confirmed transitions.
#[derive(Debug, Clone)]
pub struct FlapFilter {
    state: ConfirmationState,
    threshold: u32,
}

impl FlapFilter {
    /// Create a filter requiring `threshold` agreeing samples (minimum 1).
    pub fn new(threshold: u32) -> Self {
        Self {
            state: ConfirmationState::default(),
            threshold: threshold.max(1),
        }
    }

    /// Feed one sample. Returns the transition if this sample confirmed one.
    pub fn observe(&mut self, sample: LivenessSample) -> Option<Transition> {
        let current = sample.classify();
        let state = &mut self.state;

        if current == state.last_observed {
            state.consecutive = state.consecutive.saturating_add(1);
        } else {
            state.last_observed = current;
            state.consecutive = 1;
        }

        if current != state.last_confirmed && state.consecutive >= self.threshold {
            let from = state.last_confirmed;
            state.last_confirmed = current;
            return Some(Transition {
                from,
                to: current,
                observed_at: sample.observed_at,
            });
        }

        None
    }

    pub fn state(&self) -> ConfirmationState {
        self.state
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl Default for FlapFilter {
    fn default() -> Self {
        Self::new(STABILITY_THRESHOLD)
    }
}

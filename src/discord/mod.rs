//! Chat backend subsystem (Discord).
//!
//! # Data Flow
//! ```text
//! Confirmed transition / webhook report
//!     → notifier.rs (find-or-create channel, post message)
//!     → client.rs (REST)
//!
//! Slash command
//!     → gateway.rs (websocket session)
//!     → commands (lookup table)
//!     → client.rs (interaction callback + reply edit)
//! ```

pub mod client;
pub mod gateway;
pub mod notifier;
pub mod types;

pub use client::DiscordClient;
pub use gateway::Gateway;
pub use notifier::{DiscordNotifier, Notifier};
pub use types::{DiscordError, DiscordResult};

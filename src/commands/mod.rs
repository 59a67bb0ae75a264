//! On-demand status commands.
//!
//! # Data Flow
//! ```text
//! command name
//!     → CommandRegistry lookup
//!     → handler (one fresh probe call)
//!     → pure formatter
//!     → reply text
//! ```
//!
//! # Design Decisions
//! - Handlers are plain function pointers in a lookup table, testable
//!   without the chat transport
//! - Commands never touch the poll loop's state and never cache
//! - Every lookup produces text, even for unknown names

pub mod handlers;

use futures_util::future::BoxFuture;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::observability::metrics;
use crate::probe::{MachineProbe, ServerAddress, StatusProbe};

pub const CHECK_LIVENESS: &str = "check-liveness";
pub const LIST_PLAYERS: &str = "list-players";
pub const SERVER_INFO: &str = "server-info";
pub const MACHINE_DETAIL: &str = "machine-detail";

pub const UNKNOWN_COMMAND: &str = "❓ Unknown command.";

/// Sent when the real reply could not be delivered.
pub const REPLY_FAILED: &str = "⚠️ Something went wrong while answering this command.";

/// Slash command type for chat input commands.
const CHAT_INPUT: u8 = 1;

/// Everything a handler may query.
pub struct CommandContext {
    pub address: ServerAddress,
    pub probe: Arc<dyn StatusProbe>,
    pub machine: Option<MachineAccess>,
}

/// Machine probe plus the credential it needs.
pub struct MachineAccess {
    pub probe: Arc<dyn MachineProbe>,
    pub token: Option<String>,
}

pub type Handler = for<'a> fn(&'a CommandContext) -> BoxFuture<'a, String>;

#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    pub handler: Handler,
}

/// Registration payload for one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

/// Name → handler lookup table.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The relay's commands; `machine-detail` only when a machine endpoint exists.
    pub fn standard(include_machine: bool) -> Self {
        let mut registry = Self::new();
        registry.register(Command {
            name: CHECK_LIVENESS,
            description: "Check whether the Minecraft server is up",
            handler: handlers::check_liveness,
        });
        registry.register(Command {
            name: LIST_PLAYERS,
            description: "See who is playing on the Minecraft server",
            handler: handlers::list_players,
        });
        registry.register(Command {
            name: SERVER_INFO,
            description: "Full details about the Minecraft server",
            handler: handlers::server_info,
        });
        if include_machine {
            registry.register(Command {
                name: MACHINE_DETAIL,
                description: "Resource usage of the host machine",
                handler: handlers::machine_detail,
            });
        }
        registry
    }

    /// Add or replace a command.
    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name, command);
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    pub fn definitions(&self) -> Vec<CommandDefinition> {
        self.commands
            .values()
            .map(|c| CommandDefinition {
                name: c.name.to_string(),
                description: c.description.to_string(),
                kind: CHAT_INPUT,
            })
            .collect()
    }

    /// Run `name` and return its reply.
    pub async fn dispatch(&self, name: &str, context: &CommandContext) -> String {
        let Some(command) = self.get(name) else {
            tracing::warn!(command = %name, "Unknown command");
            return UNKNOWN_COMMAND.to_string();
        };

        tracing::debug!(command = %name, "Running command");
        metrics::record_command(command.name);
        handlers::fit_message((command.handler)(context).await)
    }
}

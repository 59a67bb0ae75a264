//! Minecraft status relay library.

pub mod commands;
pub mod config;
pub mod discord;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod probe;

pub use config::schema::RelayConfig;
pub use http::WebhookServer;
pub use lifecycle::Shutdown;

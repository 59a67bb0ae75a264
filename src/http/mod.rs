//! Inbound HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, limits, panic guard)
//!     → auth.rs (Bearer shared secret, 403 on mismatch)
//!     → status.rs
//!         POST /status/{state} → Notifier (bypasses the flap filter)
//!         GET  /status         → poll loop snapshot
//! ```

pub mod auth;
pub mod server;
pub mod status;

pub use server::{AppState, WebhookServer};

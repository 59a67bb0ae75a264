//! Network helpers for the inbound listener.

pub mod tls;

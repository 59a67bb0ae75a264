//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_probes_total` (counter): poll probes by outcome (up, down, timeout)
//! - `relay_transitions_total` (counter): confirmed transitions by state
//! - `relay_server_up` (gauge): 1 when confirmed up, 0 when confirmed down
//! - `relay_webhook_requests_total` (counter): by state and status code
//! - `relay_commands_total` (counter): command invocations by name
//! - `relay_delivery_failures_total` (counter): failed chat posts
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::health::ServerState;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(outcome: &'static str) {
    counter!("relay_probes_total", "outcome" => outcome).increment(1);
}

pub fn record_transition(state: ServerState) {
    counter!("relay_transitions_total", "state" => state.as_str()).increment(1);
    match state {
        ServerState::Up => gauge!("relay_server_up").set(1.0),
        ServerState::Down => gauge!("relay_server_up").set(0.0),
        ServerState::Unknown => {}
    }
}

pub fn record_webhook(state: &str, status: u16) {
    counter!(
        "relay_webhook_requests_total",
        "state" => state.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_command(name: &'static str) {
    counter!("relay_commands_total", "command" => name).increment(1);
}

pub fn record_delivery_failure() {
    counter!("relay_delivery_failures_total").increment(1);
}

//! Status report and snapshot handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::health::{ConfirmationState, ExternalReport};
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Serialize)]
pub struct StatusSnapshot {
    pub version: &'static str,
    /// `None` when the poll loop is disabled.
    pub monitor: Option<ConfirmationState>,
}

/// `POST /status/{state}`: announce an operator-reported state.
pub async fn report_state(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let report = match raw.parse::<ExternalReport>() {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected status report");
            metrics::record_webhook("invalid", 400);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid status type" })),
            )
                .into_response();
        }
    };

    tracing::info!(state = %report, "Status report received");
    state.notifier.deliver(report.message()).await;
    metrics::record_webhook(report.as_str(), 200);

    Json(json!({ "message": format!("Status {report} received") })).into_response()
}

/// `GET /status`: the poll loop's current debounce state.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(StatusSnapshot {
        version: env!("CARGO_PKG_VERSION"),
        monitor: state.monitor.as_ref().map(|rx| *rx.borrow()),
    })
}

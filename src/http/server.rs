//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the status handlers
//! - Wire up middleware (auth, tracing, limits, request ID, panic guard)
//! - Serve over plain TCP or TLS until shutdown

use axum::{
    body::Body,
    http::{Response, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use serde_json::json;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::WebhookConfig;
use crate::discord::Notifier;
use crate::health::ConfirmationState;
use crate::http::auth::bearer_auth;
use crate::http::status::{get_status, report_state};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub notifier: Arc<dyn Notifier>,
    pub secret: Arc<str>,
    pub monitor: Option<watch::Receiver<ConfirmationState>>,
}

impl AppState {
    pub fn new(notifier: Arc<dyn Notifier>, secret: &str) -> Self {
        Self {
            notifier,
            secret: Arc::from(secret),
            monitor: None,
        }
    }

    pub fn with_monitor(mut self, monitor: watch::Receiver<ConfirmationState>) -> Self {
        self.monitor = Some(monitor);
        self
    }
}

/// HTTP listener for status reports.
pub struct WebhookServer {
    router: Router,
}

impl WebhookServer {
    pub fn new(state: AppState, config: &WebhookConfig) -> Self {
        Self {
            router: Self::build_router(state, config),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(state: AppState, config: &WebhookConfig) -> Router {
        Router::new()
            .route("/status", get(get_status))
            .route("/status/{state}", post(report_state))
            .route_layer(middleware::from_fn_with_state(state.clone(), bearer_auth))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve plain HTTP until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Status HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Status HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS until shutdown.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        tracing::info!(address = %addr, "Status HTTPS server listening");
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("Status HTTPS server stopped");
        Ok(())
    }
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    tracing::error!("Error in status endpoint: handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}

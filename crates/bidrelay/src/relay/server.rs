//! HTTP relay server
//!
//! Exposes one relay route that forwards a submission to the configured
//! webhook and hands the reply back, plus a health check:
//! - `OPTIONS {route}`: CORS preflight
//! - `POST {route}[?stream=1]`: re-encode, forward, relay
//! - `GET /health`

use axum::{
    Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, RawQuery, Request, State},
    http::Response,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::error::{BidrelayError, Result};

use super::body::RelayBody;
use super::cors::preflight_handler;
use super::error::RelayError;
use super::response::{ResponseMode, relay_response};
use super::upstream::WebhookSource;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Relay configuration
    pub config: RelayConfig,
    /// HTTP client for upstream requests
    pub client: reqwest::Client,
    /// Where the webhook URL is read from on each request
    pub webhook: WebhookSource,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| BidrelayError::Server(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            webhook: WebhookSource::from_config(&config),
            config,
            client,
        })
    }
}

/// The relay server
pub struct RelayServer {
    config: RelayConfig,
}

impl RelayServer {
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    /// Bind the listen address and serve until Ctrl+C / SIGTERM
    pub async fn serve(&self) -> Result<()> {
        let state = Arc::new(AppState::new(self.config.clone())?);
        let app = create_router(state);

        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .map_err(|e| BidrelayError::Config(format!("Invalid listen address: {e}")))?;

        tracing::info!("Starting relay server on {addr}");
        tracing::info!("Relay route: {}", self.config.route);
        match &self.config.webhook_url {
            Some(_) => tracing::info!("Webhook URL pinned by config file"),
            None => tracing::info!(
                "Webhook URL read from ${} on each request",
                self.config.webhook_env
            ),
        }

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| BidrelayError::Server(format!("Failed to bind to {addr}: {e}")))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| BidrelayError::Server(format!("Server error: {e}")))?;

        tracing::info!("Relay server shut down gracefully");
        Ok(())
    }
}

/// Create the router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    let route = state.config.route.clone();
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_handler))
        .route(&route, post(relay_handler).options(preflight_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint - returns JSON status
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Relay one submission to the webhook
async fn relay_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    request: Request<Body>,
) -> Response<Body> {
    let span = tracing::info_span!("relay", request_id = %Uuid::new_v4());

    match forward(&state, query.as_deref(), request).instrument(span).await {
        Ok(response) => response,
        Err(e) => axum::response::IntoResponse::into_response(e),
    }
}

async fn forward(
    state: &AppState,
    query: Option<&str>,
    request: Request<Body>,
) -> std::result::Result<Response<Body>, RelayError> {
    let target = state.webhook.resolve()?;
    let mode = ResponseMode::from_query(query);

    let body = RelayBody::from_request(request, state.config.max_body_bytes).await?;
    tracing::debug!(kind = body.kind(), ?mode, "Forwarding to upstream");

    let builder = state
        .client
        .post(target)
        .header(reqwest::header::CACHE_CONTROL, "no-store");

    let upstream = body
        .attach(builder)?
        .send()
        .await
        .map_err(RelayError::from_reqwest)?;

    relay_response(upstream, mode).await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

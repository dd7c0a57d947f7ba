// ABOUTME: HTTP gateway receiving relayed platform interactions
// ABOUTME: Acknowledges immediately and dispatches each interaction on its own task

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use quoordinates_core::metrics;
use quoordinates_core::traits::ReplySurface;
use quoordinates_core::Dispatcher;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::task::TaskTracker;
use tower_http::trace::TraceLayer;

use crate::platform::{InteractionEnvelope, PlatformClient};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Builds the reply surface for one relayed interaction
pub trait SurfaceFactory: Send + Sync {
    fn surface(&self, envelope: &InteractionEnvelope) -> Box<dyn ReplySurface>;
}

impl SurfaceFactory for PlatformClient {
    fn surface(&self, envelope: &InteractionEnvelope) -> Box<dyn ReplySurface> {
        Box::new(PlatformClient::surface(self, envelope))
    }
}

#[derive(Clone)]
pub struct GatewayState {
    pub dispatcher: Arc<Dispatcher>,
    pub surfaces: Arc<dyn SurfaceFactory>,
    pub api_key: Option<String>,
    pub metrics: PrometheusHandle,
    /// In-flight dispatch tasks, drained on shutdown
    pub tasks: TaskTracker,
}

#[derive(Debug, Serialize)]
pub struct GatewayResponse {
    pub success: bool,
    pub message: String,
}

impl GatewayResponse {
    fn new(success: bool, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success,
            message: message.into(),
        })
    }
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/interactions", post(interaction_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves
pub async fn start_gateway(
    host: &str,
    port: u16,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    serve(listener, state, shutdown).await
}

/// Serve on an already bound listener. Once `shutdown` resolves, stop accepting
/// requests and wait for every in-flight dispatch to deliver its reply.
pub async fn serve(
    listener: TcpListener,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    tracing::info!(addr = ?listener.local_addr().ok(), "Starting interaction gateway");
    let tasks = state.tasks.clone();

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Gateway server failed")?;

    tasks.close();
    if !tasks.is_empty() {
        tracing::info!(in_flight = tasks.len(), "Waiting for in-flight interactions");
    }
    tasks.wait().await;
    tracing::info!("Interaction gateway stopped");
    Ok(())
}

fn authorized(expected: Option<&str>, headers: &HeaderMap) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|provided| provided == expected)
}

async fn interaction_handler(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Json(envelope): Json<InteractionEnvelope>,
) -> (StatusCode, Json<GatewayResponse>) {
    if !authorized(state.api_key.as_deref(), &headers) {
        tracing::warn!(interaction_id = %envelope.id, "Gateway authentication failed");
        metrics::record_gateway_request("auth_failed");
        metrics::record_error("gateway_auth");
        return (
            StatusCode::UNAUTHORIZED,
            GatewayResponse::new(false, "Invalid or missing API key"),
        );
    }

    tracing::info!(
        interaction_id = %envelope.id,
        kind = %envelope.kind,
        identifier = %envelope.identifier,
        "Interaction received"
    );
    metrics::record_gateway_request("accepted");

    state.tasks.spawn(dispatch_envelope(
        Arc::clone(&state.dispatcher),
        Arc::clone(&state.surfaces),
        envelope,
    ));

    (StatusCode::ACCEPTED, GatewayResponse::new(true, "Accepted"))
}

/// Dispatch one envelope. A transport failure ends this interaction only.
pub async fn dispatch_envelope(
    dispatcher: Arc<Dispatcher>,
    surfaces: Arc<dyn SurfaceFactory>,
    envelope: InteractionEnvelope,
) {
    let interaction = envelope.to_interaction();
    let surface = surfaces.surface(&envelope);

    match dispatcher.dispatch(&interaction, surface.as_ref()).await {
        Ok(outcome) => {
            tracing::debug!(interaction_id = %envelope.id, outcome = ?outcome, "Interaction finished");
        }
        Err(e) => {
            metrics::record_error("transport");
            tracing::error!(
                interaction_id = %envelope.id,
                error = ?e,
                "Could not respond to interaction"
            );
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn metrics_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    state.metrics.render()
}

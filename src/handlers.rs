use crate::errors::AppError;
use crate::pipeline::Notifier;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

/// Shared application state injected into handlers.
pub struct AppState {
    /// The notification pipeline.
    pub notifier: Notifier,
    /// Serializes runs inside this process so two triggers never deliver the
    /// same batch concurrently.
    pub run_lock: Mutex<()>,
}

impl AppState {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            notifier,
            run_lock: Mutex::new(()),
        }
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "nps-notifier",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/run
///
/// Trigger endpoint for the external scheduler. Runs the pipeline once and
/// answers with the literal status: `OK` or `Nothing to update.`.
pub async fn trigger_run(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, &'static str), AppError> {
    let _guard = state.run_lock.lock().await;
    tracing::info!("=== Trigger NPS run ===");

    let outcome = state.notifier.run().await?;
    tracing::info!("Run finished: {}", outcome.status());

    Ok((StatusCode::OK, outcome.status()))
}

/// Builds the HTTP routes.
///
/// The trigger accepts GET as well for schedulers that cannot POST.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/run", post(trigger_run).get(trigger_run))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

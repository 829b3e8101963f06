//! Axum REST API handlers

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::engine::DisplayFilter;
use crate::service::{AggregateStatistics, BatchResult, BatchService};

use super::dto::*;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Application state shared across handlers
pub struct AppState {
    pub service: Arc<BatchService>,
    pub start_time: Instant,
}

/// Create the REST API router
pub fn create_rest_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Batch operations
        .route("/api/v1/batch", post(run_batch_handler))
        .route("/api/v1/batch/cancel", post(cancel_handler))
        .route("/api/v1/batch/latest", get(latest_handler))
        .route("/api/v1/batch/latest/statistics", get(statistics_handler))
        .route("/api/v1/batch/latest/images/:image_id", get(image_handler))
        .route("/api/v1/schema", get(schema_handler))
        // System endpoints
        .route("/health", get(health_handler))
        .route("/api/v1/health", get(health_handler))
        // Middleware
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn no_run_yet() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("No batch has completed yet", "NO_RESULT")),
    )
}

/// Health check
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let running = state.service.is_running();
    let progress = running.then(|| state.service.progress());

    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        schema_attributes: state.service.schema().len(),
        image_count: state.service.image_count(),
        running,
        progress,
        last_run_id: state.service.latest().map(|r| r.run_id.to_string()),
    })
}

/// Run a full batch and return its result
async fn run_batch_handler(State(state): State<Arc<AppState>>) -> Json<BatchResult> {
    info!("Batch run requested");
    let result = state.service.run_batch().await;
    Json(result.as_ref().clone())
}

/// Cancel the running batch
async fn cancel_handler(State(state): State<Arc<AppState>>) -> Json<CancelResponse> {
    let cancelled = state.service.cancel();
    let message = if cancelled {
        "Batch will stop before the next image"
    } else {
        "No batch is running"
    };

    Json(CancelResponse {
        cancelled,
        message: message.to_string(),
    })
}

/// Latest batch result
async fn latest_handler(State(state): State<Arc<AppState>>) -> Result<Json<BatchResult>, ApiError> {
    let latest = state.service.latest().ok_or_else(no_run_yet)?;
    Ok(Json(latest.as_ref().clone()))
}

/// Statistics of the latest batch
async fn statistics_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AggregateStatistics>, ApiError> {
    let latest = state.service.latest().ok_or_else(no_run_yet)?;
    Ok(Json(latest.statistics.clone()))
}

/// One image of the latest batch, with display filtering
async fn image_handler(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<usize>,
    Query(filter): Query<DisplayFilter>,
) -> Result<Json<ImageAttributesResponse>, ApiError> {
    let latest = state.service.latest().ok_or_else(no_run_yet)?;

    let outcome = latest.outcome(image_id).ok_or_else(|| {
        error!("Image {} not in latest batch", image_id);
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(&format!("Image {} not found", image_id), "NOT_FOUND")),
        )
    })?;

    Ok(Json(ImageAttributesResponse {
        image_id,
        locator: outcome.locator.clone(),
        success: outcome.success,
        error: outcome.error.clone(),
        dominant_only: filter.dominant_only,
        high_confidence_only: filter.high_confidence_only,
        attributes: filter.apply(&outcome.observations, state.service.schema()),
    }))
}

/// Schema summary
async fn schema_handler(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    Json(SchemaResponse::from(state.service.schema().as_ref()))
}

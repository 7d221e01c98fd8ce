//! System endpoints: health check and dashboard.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::service::DashboardSummary;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    pools: usize,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp, and the number of loaded pools.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            pools: state.booking_service.store().len().await,
        }),
    )
}

/// `GET /dashboard`: Totals per pool kind.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "System",
    summary = "Dashboard summary",
    description = "Counts conferences and buses, their bookings, total capacity, and units booked.",
    responses(
        (status = 200, description = "Dashboard totals", body = DashboardSummary),
    )
)]
pub async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.booking_service.dashboard().await)
}

/// Dashboard route, mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard_handler))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

//! Booking handlers: book and recent-bookings queries.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{BookRequest, BookResponse, BookingListResponse, LimitParams};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::error::{ErrorResponse, InventoryError};

/// `POST /pools/{id}/book`: Book tickets or seats.
///
/// # Errors
///
/// Returns the typed rejection from the booking core: invalid request,
/// unknown pool, insufficient capacity, unavailable seat, or storage
/// failure.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/book",
    tag = "Bookings",
    summary = "Book tickets or seats",
    description = "Atomically books `quantity` tickets of a conference or the listed `seat_numbers` of a bus. Either every requested unit is granted or none is.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = BookRequest,
    responses(
        (status = 200, description = "Booking committed", body = BookResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Insufficient capacity or seat unavailable", body = ErrorResponse),
        (status = 500, description = "Booking was not committed", body = ErrorResponse),
    )
)]
pub async fn book(
    State(state): State<AppState>,
    id: Result<Path<uuid::Uuid>, PathRejection>,
    payload: Result<Json<BookRequest>, JsonRejection>,
) -> Result<impl IntoResponse, InventoryError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let request = req.into_domain(PoolId::from_uuid(id))?;
    let allocated = state.booking_service.book(&request).await?;
    Ok(Json(BookResponse::from(allocated)))
}

/// `GET /pools/{id}/bookings`: Recent bookings of one pool.
///
/// # Errors
///
/// Returns [`InventoryError::NotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/bookings",
    tag = "Bookings",
    summary = "Recent bookings of a pool",
    description = "Returns the pool's most recent bookings, newest first.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        LimitParams,
    ),
    responses(
        (status = 200, description = "Bookings, newest first", body = BookingListResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn pool_bookings(
    State(state): State<AppState>,
    id: Result<Path<uuid::Uuid>, PathRejection>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> Result<impl IntoResponse, InventoryError> {
    let Path(id) = id?;
    let Query(params) = params?;
    let records = state
        .booking_service
        .recent_bookings(PoolId::from_uuid(id), params.limit)
        .await?;
    Ok(Json(BookingListResponse::from(records)))
}

/// `GET /bookings`: Recent bookings across all pools.
///
/// # Errors
///
/// Returns [`InventoryError::InvalidRequest`] on a malformed `limit`.
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    summary = "Recent bookings",
    description = "Returns the most recent bookings across every pool, newest first.",
    params(LimitParams),
    responses(
        (status = 200, description = "Bookings, newest first", body = BookingListResponse),
    )
)]
pub async fn all_bookings(
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> Result<impl IntoResponse, InventoryError> {
    let Query(params) = params?;
    let records = state.booking_service.all_recent_bookings(params.limit).await;
    Ok(Json(BookingListResponse::from(records)))
}

/// Booking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools/{id}/book", post(book))
        .route("/pools/{id}/bookings", get(pool_bookings))
        .route("/bookings", get(all_bookings))
}

//! Pool handlers: create, list, get, seat map.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreatePoolRequest, CreatePoolResponse, ListPoolsParams, PaginationMeta, PoolDetailResponse,
    PoolListResponse, PoolSummaryDto, SeatMapParams, SeatMapResponse, clamp_page,
};
use crate::app_state::AppState;
use crate::domain::{PoolId, PoolMetadata};
use crate::error::{ErrorResponse, InventoryError};

/// `POST /pools`: Create a conference or bus.
///
/// # Errors
///
/// Returns [`InventoryError::InvalidRequest`] on a malformed body, a size
/// outside the allowed range, or an invalid name.
#[utoipa::path(
    post,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "Create a pool",
    description = "Creates a capacity pool (conference tickets) or a slotted pool (bus seats numbered 1..=size).",
    request_body = CreatePoolRequest,
    responses(
        (status = 201, description = "Pool created", body = CreatePoolResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Pool could not be stored", body = ErrorResponse),
    )
)]
pub async fn create_pool(
    State(state): State<AppState>,
    payload: Result<Json<CreatePoolRequest>, JsonRejection>,
) -> Result<impl IntoResponse, InventoryError> {
    let Json(req) = payload?;
    let metadata = PoolMetadata {
        name: req.name,
        attributes: req.attributes,
    };
    let pool = state
        .booking_service
        .create_pool(req.kind, req.size, metadata)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatePoolResponse::from(&pool))))
}

/// `GET /pools`: List pools with pagination and optional kind filter.
///
/// # Errors
///
/// Returns [`InventoryError::InvalidRequest`] on malformed query parameters.
#[utoipa::path(
    get,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "List pools",
    description = "Returns a paginated list of pools, oldest first, optionally filtered by kind.",
    params(ListPoolsParams),
    responses(
        (status = 200, description = "Paginated pool list", body = PoolListResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    )
)]
pub async fn list_pools(
    State(state): State<AppState>,
    params: Result<Query<ListPoolsParams>, QueryRejection>,
) -> Result<impl IntoResponse, InventoryError> {
    let Query(params) = params?;
    let (page, per_page) = clamp_page(params.page, params.per_page);
    let summaries = state.booking_service.list_pools(params.kind).await;

    let total = u32::try_from(summaries.len()).unwrap_or(u32::MAX);
    let pagination = PaginationMeta::new(page, per_page, total);
    let data: Vec<PoolSummaryDto> = summaries
        .into_iter()
        .skip(pagination.offset())
        .take(per_page as usize)
        .map(PoolSummaryDto::from)
        .collect();

    Ok(Json(PoolListResponse { data, pagination }))
}

/// `GET /pools/{id}`: Get pool details.
///
/// # Errors
///
/// Returns [`InventoryError::NotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}",
    tag = "Pools",
    summary = "Get pool details",
    description = "Returns a pool's metadata with its current booked and remaining counts.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    responses(
        (status = 200, description = "Pool details", body = PoolDetailResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    id: Result<Path<uuid::Uuid>, PathRejection>,
) -> Result<impl IntoResponse, InventoryError> {
    let Path(id) = id?;
    let details = state
        .booking_service
        .get_pool(PoolId::from_uuid(id))
        .await?;
    Ok(Json(PoolDetailResponse::from(details)))
}

/// `GET /pools/{id}/seats`: Seat map of a bus.
///
/// # Errors
///
/// Returns [`InventoryError::NotFound`] for an unknown pool and
/// [`InventoryError::InvalidRequest`] for a capacity pool.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/seats",
    tag = "Pools",
    summary = "Get seat map",
    description = "Lists the seats of a slotted pool with their status.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        SeatMapParams,
    ),
    responses(
        (status = 200, description = "Seat map", body = SeatMapResponse),
        (status = 400, description = "Pool has no seats", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn seat_map(
    State(state): State<AppState>,
    id: Result<Path<uuid::Uuid>, PathRejection>,
    params: Result<Query<SeatMapParams>, QueryRejection>,
) -> Result<impl IntoResponse, InventoryError> {
    let Path(id) = id?;
    let Query(params) = params?;
    let pool_id = PoolId::from_uuid(id);
    let seats = state
        .booking_service
        .seat_map(pool_id, params.only_available)
        .await?;
    Ok(Json(SeatMapResponse {
        pool_id,
        count: seats.len(),
        seats,
    }))
}

/// Pool routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools", post(create_pool).get(list_pools))
        .route("/pools/{id}", get(get_pool))
        .route("/pools/{id}/seats", get(seat_map))
}

//! Pool-related DTOs for create, get, list, and seat map operations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, default_page, default_per_page};
use crate::domain::{Pool, PoolId, PoolKind, PoolSummary, Seat};
use crate::service::PoolDetails;

/// Request body for `POST /pools`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePoolRequest {
    /// `"capacity"` for a conference, `"slotted"` for a bus.
    pub kind: PoolKind,
    /// Number of tickets or seats.
    pub size: u32,
    /// Display name (1 to 100 characters).
    pub name: String,
    /// Free-form attributes such as origin, destination, or dates.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Response body for `POST /pools` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePoolResponse {
    /// Unique pool identifier.
    pub pool_id: PoolId,
    /// Pool kind.
    pub kind: PoolKind,
    /// Stored (trimmed) name.
    pub name: String,
    /// Number of tickets or seats.
    pub total: u32,
    /// Server creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Pool> for CreatePoolResponse {
    fn from(pool: &Pool) -> Self {
        Self {
            pool_id: pool.id,
            kind: pool.kind,
            name: pool.metadata.name.clone(),
            total: pool.total,
            created_at: pool.created_at,
        }
    }
}

/// Single pool detail for `GET /pools/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolDetailResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Pool kind.
    pub kind: PoolKind,
    /// Display name.
    pub name: String,
    /// Free-form attributes.
    pub attributes: BTreeMap<String, String>,
    /// Total tickets or seats.
    pub total: u32,
    /// Units booked.
    pub booked: u32,
    /// Units still available.
    pub remaining: u32,
    /// Number of committed bookings.
    pub booking_count: usize,
    /// `true` once nothing remains.
    pub sold_out: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<PoolDetails> for PoolDetailResponse {
    fn from(details: PoolDetails) -> Self {
        let PoolDetails {
            pool,
            booked,
            remaining,
            bookings,
        } = details;
        Self {
            pool_id: pool.id,
            kind: pool.kind,
            name: pool.metadata.name,
            attributes: pool.metadata.attributes,
            total: pool.total,
            booked,
            remaining,
            booking_count: bookings,
            sold_out: remaining == 0,
            created_at: pool.created_at,
        }
    }
}

/// Pool summary for list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolSummaryDto {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Pool kind.
    pub kind: PoolKind,
    /// Display name.
    pub name: String,
    /// Total tickets or seats.
    pub total: u32,
    /// Units still available.
    pub remaining: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<PoolSummary> for PoolSummaryDto {
    fn from(s: PoolSummary) -> Self {
        Self {
            pool_id: s.pool_id,
            kind: s.kind,
            name: s.name,
            total: s.total,
            remaining: s.remaining,
            created_at: s.created_at,
        }
    }
}

/// Paginated list response for `GET /pools`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolListResponse {
    /// Pool summaries on this page.
    pub data: Vec<PoolSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Query parameters for `GET /pools`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPoolsParams {
    /// Only return pools of this kind.
    #[serde(default)]
    pub kind: Option<PoolKind>,
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Query parameters for `GET /pools/{id}/seats`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SeatMapParams {
    /// Only list seats that can still be booked.
    #[serde(default)]
    pub only_available: bool,
}

/// Response body for `GET /pools/{id}/seats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SeatMapResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Number of seats listed.
    pub count: usize,
    /// Seats in ascending seat-number order.
    pub seats: Vec<Seat>,
}

//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto;
use super::handlers;
use crate::domain::{Allocation, BookingId, Customer, PoolId, PoolKind, Seat, SeatStatus};
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::{DashboardSummary, KindTotals};

/// Generated OpenAPI document.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "seatbook",
        description = "Inventory allocation for bus seats and conference tickets"
    ),
    paths(
        handlers::pool::create_pool,
        handlers::pool::list_pools,
        handlers::pool::get_pool,
        handlers::pool::seat_map,
        handlers::booking::book,
        handlers::booking::pool_bookings,
        handlers::booking::all_bookings,
        handlers::system::dashboard_handler,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::CreatePoolRequest,
        dto::CreatePoolResponse,
        dto::PoolDetailResponse,
        dto::PoolSummaryDto,
        dto::PoolListResponse,
        dto::PaginationMeta,
        dto::SeatMapResponse,
        dto::BookRequest,
        dto::BookResponse,
        dto::BookingRecordDto,
        dto::BookingListResponse,
        handlers::system::HealthResponse,
        DashboardSummary,
        KindTotals,
        PoolId,
        BookingId,
        PoolKind,
        Seat,
        SeatStatus,
        Customer,
        Allocation,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Pools", description = "Conferences (capacity pools) and buses (slotted pools)"),
        (name = "Bookings", description = "Atomic bookings and the booking ledger"),
        (name = "System", description = "Health and dashboard"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/swagger-ui`, serving the document at
/// `/api-docs/openapi.json`.
#[cfg(feature = "swagger-ui")]
#[must_use]
pub fn swagger_ui() -> utoipa_swagger_ui::SwaggerUi {
    utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/pools",
            "/api/v1/pools/{id}",
            "/api/v1/pools/{id}/seats",
            "/api/v1/pools/{id}/book",
            "/api/v1/pools/{id}/bookings",
            "/api/v1/bookings",
            "/api/v1/dashboard",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}

//! Booking DTOs: book request/response and ledger listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Allocation, BookingId, BookingRecord, BookingRequest, Customer, PoolId};
use crate::error::InventoryError;
use crate::inventory::Allocated;

/// Request body for `POST /pools/{id}/book`.
///
/// Conference (capacity) pools take `quantity`; bus (slotted) pools take
/// `seat_numbers`. Exactly one of the two must be present.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct BookRequest {
    /// Who is booking.
    pub customer: Customer,
    /// Number of tickets (capacity pools).
    #[serde(default)]
    pub quantity: Option<u32>,
    /// Seat numbers (slotted pools).
    #[serde(default)]
    pub seat_numbers: Option<Vec<u32>>,
}

impl BookRequest {
    /// Converts the body into a domain request for `pool_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidRequest`] unless exactly one of
    /// `quantity` and `seat_numbers` is set.
    pub fn into_domain(self, pool_id: PoolId) -> Result<BookingRequest, InventoryError> {
        match (self.quantity, self.seat_numbers) {
            (Some(quantity), None) => Ok(BookingRequest::tickets(pool_id, self.customer, quantity)),
            (None, Some(seats)) => Ok(BookingRequest::seats(pool_id, self.customer, seats)),
            (Some(_), Some(_)) => Err(InventoryError::InvalidRequest(
                "send either quantity or seat_numbers, not both".to_string(),
            )),
            (None, None) => Err(InventoryError::InvalidRequest(
                "quantity or seat_numbers is required".to_string(),
            )),
        }
    }
}

/// Response body for a committed booking.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookResponse {
    /// Confirmation identifier.
    pub booking_id: BookingId,
    /// Pool the booking belongs to.
    pub pool_id: PoolId,
    /// Units granted.
    pub allocation: Allocation,
    /// Units remaining after this booking.
    pub remaining: u32,
    /// Commit timestamp.
    pub booked_at: DateTime<Utc>,
}

impl From<Allocated> for BookResponse {
    fn from(allocated: Allocated) -> Self {
        let Allocated { record, remaining } = allocated;
        Self {
            booking_id: record.booking_id,
            pool_id: record.pool_id,
            allocation: record.allocation,
            remaining,
            booked_at: record.booked_at,
        }
    }
}

/// One ledger entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingRecordDto {
    /// Confirmation identifier.
    pub booking_id: BookingId,
    /// Pool the booking belongs to.
    pub pool_id: PoolId,
    /// Who booked.
    pub customer: Customer,
    /// Units granted.
    pub allocation: Allocation,
    /// Number of tickets or seats granted.
    pub allocated_units: u32,
    /// Units remaining right after the commit.
    pub remaining_after: u32,
    /// Commit timestamp.
    pub booked_at: DateTime<Utc>,
}

impl From<BookingRecord> for BookingRecordDto {
    fn from(record: BookingRecord) -> Self {
        Self {
            allocated_units: record.allocated_units(),
            booking_id: record.booking_id,
            pool_id: record.pool_id,
            customer: record.customer,
            allocation: record.allocation,
            remaining_after: record.remaining_after,
            booked_at: record.booked_at,
        }
    }
}

/// Response body for recent-bookings endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingListResponse {
    /// Records, newest first.
    pub data: Vec<BookingRecordDto>,
}

impl From<Vec<BookingRecord>> for BookingListResponse {
    fn from(records: Vec<BookingRecord>) -> Self {
        Self {
            data: records.into_iter().map(BookingRecordDto::from).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn body(json: serde_json::Value) -> BookRequest {
        let Ok(request) = serde_json::from_value(json) else {
            panic!("body should deserialize");
        };
        request
    }

    fn customer_json() -> serde_json::Value {
        serde_json::json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com"
        })
    }

    #[test]
    fn quantity_becomes_ticket_request() {
        let pool_id = PoolId::new();
        let request = body(serde_json::json!({ "customer": customer_json(), "quantity": 3 }));
        let Ok(domain) = request.into_domain(pool_id) else {
            panic!("conversion failed");
        };
        assert_eq!(domain.allocation, Allocation::Tickets { quantity: 3 });
        assert_eq!(domain.pool_id, pool_id);
    }

    #[test]
    fn both_or_neither_field_is_invalid() {
        let both = body(serde_json::json!({
            "customer": customer_json(),
            "quantity": 1,
            "seat_numbers": [1]
        }));
        assert!(matches!(
            both.into_domain(PoolId::new()),
            Err(InventoryError::InvalidRequest(_))
        ));

        let neither = body(serde_json::json!({ "customer": customer_json() }));
        assert!(matches!(
            neither.into_domain(PoolId::new()),
            Err(InventoryError::InvalidRequest(_))
        ));
    }

    #[test]
    fn legacy_tickets_field_is_refused() {
        let parsed = serde_json::from_value::<BookRequest>(serde_json::json!({
            "customer": customer_json(),
            "tickets": 2
        }));
        assert!(parsed.is_err());
    }
}

//! Database row models for pools, seats, and bookings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Allocation, BookingId, BookingRecord, Customer, Pool, PoolId, PoolKind, PoolMetadata,
    PoolState, SeatStatus,
};
use crate::error::InventoryError;

/// A row of the `pools` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PoolRow {
    /// Pool identifier.
    pub id: Uuid,
    /// `"capacity"` or `"slotted"`.
    pub kind: String,
    /// Total units.
    pub total: i32,
    /// Units booked so far (both kinds).
    pub booked: i32,
    /// Display name.
    pub name: String,
    /// Metadata attributes as JSONB.
    pub attributes: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl PoolRow {
    /// Decodes the immutable pool description.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StorageFailure`] on an unknown kind, a
    /// negative total, or malformed attributes.
    pub fn to_pool(&self) -> Result<Pool, InventoryError> {
        let kind = PoolKind::parse(&self.kind)
            .map_err(|_| corrupt(format!("pool {} has unknown kind {:?}", self.id, self.kind)))?;
        let attributes: BTreeMap<String, String> =
            serde_json::from_value(self.attributes.clone())
                .map_err(|e| corrupt(format!("pool {} attributes: {e}", self.id)))?;
        Ok(Pool {
            id: PoolId::from_uuid(self.id),
            kind,
            total: to_u32(self.total, "total")?,
            metadata: PoolMetadata {
                name: self.name.clone(),
                attributes,
            },
            created_at: self.created_at,
        })
    }
}

/// A row of the `pool_seats` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SeatRow {
    /// Owning pool.
    pub pool_id: Uuid,
    /// Seat number.
    pub seat_number: i32,
    /// `"available"` or `"booked"`.
    pub status: String,
}

impl SeatRow {
    /// Decodes the seat number and status.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StorageFailure`] on an unknown status or a
    /// negative seat number.
    pub fn to_seat(&self) -> Result<(u32, SeatStatus), InventoryError> {
        let status = match self.status.as_str() {
            "available" => SeatStatus::Available,
            "booked" => SeatStatus::Booked,
            other => {
                return Err(corrupt(format!(
                    "seat {} of pool {} has unknown status {other:?}",
                    self.seat_number, self.pool_id
                )));
            }
        };
        Ok((to_u32(self.seat_number, "seat_number")?, status))
    }
}

/// A row of the `bookings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    /// Booking identifier.
    pub id: Uuid,
    /// Pool the booking belongs to.
    pub pool_id: Uuid,
    /// Customer given name.
    pub first_name: String,
    /// Customer family name.
    pub last_name: String,
    /// Customer email.
    pub email: String,
    /// Serialized [`Allocation`].
    pub allocation: serde_json::Value,
    /// Remaining units right after the commit.
    pub remaining_after: i32,
    /// Commit timestamp.
    pub booked_at: DateTime<Utc>,
}

impl BookingRow {
    /// Decodes the ledger record.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StorageFailure`] if the allocation JSON is
    /// malformed.
    pub fn to_record(&self) -> Result<BookingRecord, InventoryError> {
        let allocation: Allocation = serde_json::from_value(self.allocation.clone())
            .map_err(|e| corrupt(format!("booking {} allocation: {e}", self.id)))?;
        Ok(BookingRecord {
            booking_id: BookingId::from_uuid(self.id),
            pool_id: PoolId::from_uuid(self.pool_id),
            customer: Customer::new(
                self.first_name.clone(),
                self.last_name.clone(),
                self.email.clone(),
            ),
            allocation,
            remaining_after: to_u32(self.remaining_after, "remaining_after")?,
            booked_at: self.booked_at,
        })
    }
}

/// Rebuilds a pool's state from its row and, for slotted pools, its seats.
///
/// # Errors
///
/// Returns [`InventoryError::StorageFailure`] on undecodable rows.
pub fn state_from_rows(row: &PoolRow, seats: &[SeatRow]) -> Result<PoolState, InventoryError> {
    let pool = row.to_pool()?;
    match pool.kind {
        PoolKind::Capacity => Ok(PoolState::Capacity {
            total: pool.total,
            booked: to_u32(row.booked, "booked")?,
        }),
        PoolKind::Slotted => {
            let seats = seats
                .iter()
                .map(SeatRow::to_seat)
                .collect::<Result<_, _>>()?;
            Ok(PoolState::Slotted { seats })
        }
    }
}

/// Converts a `u32` into the `INTEGER` column type.
///
/// # Errors
///
/// Returns [`InventoryError::StorageFailure`] if the value exceeds
/// `i32::MAX`.
pub fn to_i32(value: u32, column: &str) -> Result<i32, InventoryError> {
    i32::try_from(value).map_err(|_| corrupt(format!("{column} {value} exceeds INTEGER range")))
}

fn to_u32(value: i32, column: &str) -> Result<u32, InventoryError> {
    u32::try_from(value).map_err(|_| corrupt(format!("{column} is negative: {value}")))
}

fn corrupt(reason: String) -> InventoryError {
    InventoryError::StorageFailure(reason)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn pool_row(kind: &str, total: i32, booked: i32) -> PoolRow {
        PoolRow {
            id: Uuid::new_v4(),
            kind: kind.to_string(),
            total,
            booked,
            name: "Bee Tours".to_string(),
            attributes: serde_json::json!({ "origin": "City A", "destination": "City B" }),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn capacity_state_comes_from_booked_column() {
        let row = pool_row("capacity", 50, 12);
        let Ok(state) = state_from_rows(&row, &[]) else {
            panic!("row should decode");
        };
        assert_eq!(state.remaining(), 38);

        let Ok(pool) = row.to_pool() else {
            panic!("row should decode");
        };
        assert_eq!(pool.metadata.attributes.get("origin").map(String::as_str), Some("City A"));
    }

    #[test]
    fn slotted_state_comes_from_seat_rows() {
        let row = pool_row("slotted", 2, 1);
        let seats = vec![
            SeatRow {
                pool_id: row.id,
                seat_number: 1,
                status: "booked".to_string(),
            },
            SeatRow {
                pool_id: row.id,
                seat_number: 2,
                status: "available".to_string(),
            },
        ];
        let Ok(state) = state_from_rows(&row, &seats) else {
            panic!("rows should decode");
        };
        assert_eq!(state.seat_status(1), Some(SeatStatus::Booked));
        assert_eq!(state.remaining(), 1);
    }

    #[test]
    fn unknown_kind_is_storage_failure() {
        let row = pool_row("tickets", 1, 0);
        assert!(matches!(row.to_pool(), Err(InventoryError::StorageFailure(_))));
    }

    #[test]
    fn booking_row_decodes_allocation() {
        let row = BookingRow {
            id: Uuid::new_v4(),
            pool_id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            allocation: serde_json::json!({ "type": "seats", "seat_numbers": [4, 5] }),
            remaining_after: 10,
            booked_at: Utc::now(),
        };
        let Ok(record) = row.to_record() else {
            panic!("row should decode");
        };
        assert_eq!(record.allocated_units(), 2);
        assert_eq!(record.remaining_after, 10);
    }
}

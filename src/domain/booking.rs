//! Booking requests and committed booking records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::pool::PoolKind;
use super::{BookingId, PoolId};

/// The person a booking is made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact address for the ticket.
    pub email: String,
}

impl Customer {
    /// Creates a customer from its three fields.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }
}

/// What a booking takes from a pool.
///
/// Capacity pools are booked by ticket count, slotted pools by explicit seat
/// numbers. The two shapes never mix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Allocation {
    /// A number of fungible tickets.
    Tickets {
        /// Ticket count, at least 1.
        quantity: u32,
    },
    /// A set of numbered seats.
    Seats {
        /// Requested seat numbers, non-empty and without duplicates.
        seat_numbers: Vec<u32>,
    },
}

impl Allocation {
    /// Number of inventory units this allocation consumes.
    #[must_use]
    pub fn units(&self) -> u32 {
        match self {
            Self::Tickets { quantity } => *quantity,
            Self::Seats { seat_numbers } => {
                u32::try_from(seat_numbers.len()).unwrap_or(u32::MAX)
            }
        }
    }

    /// Pool kind this allocation applies to.
    #[must_use]
    pub const fn kind(&self) -> PoolKind {
        match self {
            Self::Tickets { .. } => PoolKind::Capacity,
            Self::Seats { .. } => PoolKind::Slotted,
        }
    }

    /// Seat numbers, if this is a seat allocation.
    #[must_use]
    pub fn seat_numbers(&self) -> Option<&[u32]> {
        match self {
            Self::Tickets { .. } => None,
            Self::Seats { seat_numbers } => Some(seat_numbers),
        }
    }
}

/// A booking attempt as received from the caller. Transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    /// Target pool.
    pub pool_id: PoolId,
    /// Who is booking.
    pub customer: Customer,
    /// What is being booked.
    pub allocation: Allocation,
}

impl BookingRequest {
    /// Requests `quantity` tickets from a capacity pool.
    #[must_use]
    pub fn tickets(pool_id: PoolId, customer: Customer, quantity: u32) -> Self {
        Self {
            pool_id,
            customer,
            allocation: Allocation::Tickets { quantity },
        }
    }

    /// Requests specific seats from a slotted pool.
    #[must_use]
    pub fn seats(pool_id: PoolId, customer: Customer, seat_numbers: Vec<u32>) -> Self {
        Self {
            pool_id,
            customer,
            allocation: Allocation::Seats { seat_numbers },
        }
    }
}

/// Ledger entry for one committed booking. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Confirmation identifier.
    pub booking_id: BookingId,
    /// Pool the units were taken from.
    pub pool_id: PoolId,
    /// Who booked.
    pub customer: Customer,
    /// Units granted.
    pub allocation: Allocation,
    /// Pool `remaining` immediately after this commit.
    pub remaining_after: u32,
    /// Commit timestamp.
    pub booked_at: DateTime<Utc>,
}

impl BookingRecord {
    /// Number of units this booking consumed.
    #[must_use]
    pub fn allocated_units(&self) -> u32 {
        self.allocation.units()
    }
}

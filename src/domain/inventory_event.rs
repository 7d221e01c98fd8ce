//! Domain events reflecting committed inventory changes.
//!
//! Events are published through the [`super::EventBus`] only after the
//! corresponding commit is durable. Subscribers (WebSocket clients, the
//! ticket dispatcher) therefore never observe a booking that could still be
//! rolled back.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::booking::{Allocation, Customer};
use super::pool::PoolKind;
use super::{BookingId, PoolId};

/// Domain event emitted after a committed change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum InventoryEvent {
    /// A new pool was created.
    PoolCreated {
        /// Pool identifier.
        pool_id: PoolId,
        /// Pool kind.
        kind: PoolKind,
        /// Display name.
        name: String,
        /// Total tickets or seats.
        total: u32,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A booking was committed.
    BookingConfirmed {
        /// Pool identifier.
        pool_id: PoolId,
        /// Confirmation identifier.
        booking_id: BookingId,
        /// Who booked.
        customer: Customer,
        /// Units granted.
        allocation: Allocation,
        /// Remaining units after the commit.
        remaining: u32,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The last unit of a pool was booked.
    PoolSoldOut {
        /// Pool identifier.
        pool_id: PoolId,
        /// Timestamp of the booking that exhausted the pool.
        timestamp: DateTime<Utc>,
    },
}

impl InventoryEvent {
    /// Returns the pool ID associated with this event.
    #[must_use]
    pub fn pool_id(&self) -> PoolId {
        match self {
            Self::PoolCreated { pool_id, .. }
            | Self::BookingConfirmed { pool_id, .. }
            | Self::PoolSoldOut { pool_id, .. } => *pool_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PoolCreated { .. } => "pool_created",
            Self::BookingConfirmed { .. } => "booking_confirmed",
            Self::PoolSoldOut { .. } => "pool_sold_out",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_confirmed_serializes_with_tag() {
        let event = InventoryEvent::BookingConfirmed {
            pool_id: PoolId::new(),
            booking_id: BookingId::new(),
            customer: Customer::new("Ada", "Lovelace", "ada@example.com"),
            allocation: Allocation::Seats {
                seat_numbers: vec![3],
            },
            remaining: 9,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"booking_confirmed\""));
        assert!(json.contains("\"remaining\":9"));
        assert_eq!(event.event_type_str(), "booking_confirmed");
    }

    #[test]
    fn pool_id_accessor() {
        let id = PoolId::new();
        let event = InventoryEvent::PoolSoldOut {
            pool_id: id,
            timestamp: Utc::now(),
        };
        assert_eq!(event.pool_id(), id);
        assert_eq!(event.event_type_str(), "pool_sold_out");
    }
}

//! Pool definitions and live inventory state.
//!
//! A [`Pool`] is the immutable description of a bookable inventory (a bus
//! or a conference). Its [`PoolState`] is the mutable part: a ticket count
//! for capacity pools, or a seat map for slotted pools. State never changes
//! in place; [`PoolState::apply`] returns the next state so that a commit is
//! either fully applied or not applied at all.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PoolId;
use super::booking::Allocation;
use crate::error::InventoryError;

/// Longest accepted pool name, in characters.
pub const MAX_POOL_NAME_LEN: usize = 100;

/// How a pool tracks its inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    /// Fungible ticket count (conferences).
    Capacity,
    /// Individually numbered seats (buses).
    Slotted,
}

impl PoolKind {
    /// Returns the kind as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Capacity => "capacity",
            Self::Slotted => "slotted",
        }
    }

    /// Parses the wire representation produced by [`PoolKind::as_str`].
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidRequest`] for any other string.
    pub fn parse(raw: &str) -> Result<Self, InventoryError> {
        match raw {
            "capacity" => Ok(Self::Capacity),
            "slotted" => Ok(Self::Slotted),
            other => Err(InventoryError::InvalidRequest(format!(
                "unknown pool kind: {other}"
            ))),
        }
    }
}

/// Descriptive data attached to a pool at creation.
///
/// The allocation core never interprets `attributes`; they carry whatever
/// the caller needs to render the pool (origin, destination, trip date,
/// venue, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct PoolMetadata {
    /// Display name, e.g. `"Bee Tours 10:00"` or `"RustConf"`.
    pub name: String,
    /// Free-form string attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl PoolMetadata {
    /// Creates metadata with a name and no attributes.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }
}

/// Immutable description of a bookable pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Unique pool identifier.
    pub id: PoolId,
    /// Capacity or slotted.
    pub kind: PoolKind,
    /// Total number of tickets or seats. Never resized.
    pub total: u32,
    /// Name and display attributes.
    pub metadata: PoolMetadata,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Pool {
    /// Describes a new pool stamped with the current time.
    #[must_use]
    pub fn new(kind: PoolKind, total: u32, metadata: PoolMetadata) -> Self {
        Self {
            id: PoolId::new(),
            kind,
            total,
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Returns the state of this pool before any booking.
    #[must_use]
    pub fn initial_state(&self) -> PoolState {
        PoolState::fresh(self.kind, self.total)
    }
}

/// Booking status of a single seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    /// Seat can still be booked.
    Available,
    /// Seat belongs to a committed booking.
    Booked,
}

impl SeatStatus {
    /// Returns the status as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
        }
    }
}

/// One entry of a slotted pool's seat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Seat {
    /// Seat number, unique within the pool.
    pub seat_number: u32,
    /// Current status.
    pub status: SeatStatus,
}

/// Live inventory state of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoolState {
    /// Ticket count. Invariant: `booked <= total`.
    Capacity {
        /// Total tickets.
        total: u32,
        /// Tickets sold so far.
        booked: u32,
    },
    /// Seat map keyed by seat number. Seat numbers are fixed at creation.
    Slotted {
        /// Status of every seat.
        seats: BTreeMap<u32, SeatStatus>,
    },
}

impl PoolState {
    /// Builds an empty state. Slotted pools get seats numbered `1..=total`.
    #[must_use]
    pub fn fresh(kind: PoolKind, total: u32) -> Self {
        match kind {
            PoolKind::Capacity => Self::Capacity { total, booked: 0 },
            PoolKind::Slotted => Self::Slotted {
                seats: (1..=total).map(|n| (n, SeatStatus::Available)).collect(),
            },
        }
    }

    /// Returns the kind of pool this state belongs to.
    #[must_use]
    pub const fn kind(&self) -> PoolKind {
        match self {
            Self::Capacity { .. } => PoolKind::Capacity,
            Self::Slotted { .. } => PoolKind::Slotted,
        }
    }

    /// Total units in the pool.
    #[must_use]
    pub fn total(&self) -> u32 {
        match self {
            Self::Capacity { total, .. } => *total,
            Self::Slotted { seats } => u32::try_from(seats.len()).unwrap_or(u32::MAX),
        }
    }

    /// Units already booked.
    #[must_use]
    pub fn booked(&self) -> u32 {
        match self {
            Self::Capacity { booked, .. } => *booked,
            Self::Slotted { seats } => {
                let count = seats
                    .values()
                    .filter(|s| **s == SeatStatus::Booked)
                    .count();
                u32::try_from(count).unwrap_or(u32::MAX)
            }
        }
    }

    /// Units still available: `total - booked`.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.total().saturating_sub(self.booked())
    }

    /// Returns the status of one seat, or `None` for capacity pools and
    /// unknown seat numbers.
    #[must_use]
    pub fn seat_status(&self, seat_number: u32) -> Option<SeatStatus> {
        match self {
            Self::Capacity { .. } => None,
            Self::Slotted { seats } => seats.get(&seat_number).copied(),
        }
    }

    /// Returns the seat map in seat-number order (empty for capacity pools).
    #[must_use]
    pub fn seats(&self) -> Vec<Seat> {
        match self {
            Self::Capacity { .. } => Vec::new(),
            Self::Slotted { seats } => seats
                .iter()
                .map(|(n, s)| Seat {
                    seat_number: *n,
                    status: *s,
                })
                .collect(),
        }
    }

    /// Computes the state after `allocation`, leaving `self` untouched.
    ///
    /// Seats are granted all-or-nothing: if any requested seat is already
    /// booked the whole allocation is refused.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::InsufficientCapacity`] when the quantity exceeds
    ///   the remaining tickets.
    /// - [`InventoryError::SeatUnavailable`] for the first requested seat
    ///   that is already booked.
    /// - [`InventoryError::InvalidRequest`] when the allocation kind does not
    ///   match the pool kind, a seat does not exist, or a seat is repeated.
    pub fn apply(&self, allocation: &Allocation) -> Result<Self, InventoryError> {
        match (self, allocation) {
            (Self::Capacity { total, booked }, Allocation::Tickets { quantity }) => {
                let remaining = total.saturating_sub(*booked);
                if *quantity > remaining {
                    return Err(InventoryError::InsufficientCapacity {
                        requested: *quantity,
                        remaining,
                    });
                }
                Ok(Self::Capacity {
                    total: *total,
                    booked: booked.saturating_add(*quantity),
                })
            }
            (Self::Slotted { seats }, Allocation::Seats { seat_numbers }) => {
                let mut seen = BTreeSet::new();
                for n in seat_numbers {
                    if !seen.insert(*n) {
                        return Err(InventoryError::InvalidRequest(format!(
                            "seat {n} requested more than once"
                        )));
                    }
                    match seats.get(n) {
                        None => {
                            return Err(InventoryError::InvalidRequest(format!(
                                "seat {n} does not exist"
                            )));
                        }
                        Some(SeatStatus::Booked) => {
                            return Err(InventoryError::SeatUnavailable(*n));
                        }
                        Some(SeatStatus::Available) => {}
                    }
                }
                let mut next = seats.clone();
                for n in seat_numbers {
                    next.insert(*n, SeatStatus::Booked);
                }
                Ok(Self::Slotted { seats: next })
            }
            (state, allocation) => Err(InventoryError::InvalidRequest(format!(
                "{} allocation cannot be applied to a {} pool",
                allocation.kind().as_str(),
                state.kind().as_str()
            ))),
        }
    }
}

/// Lightweight summary of a pool for list endpoints and dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Pool kind.
    pub kind: PoolKind,
    /// Display name.
    pub name: String,
    /// Total units.
    pub total: u32,
    /// Units still available.
    pub remaining: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl PoolSummary {
    /// Builds a summary from a pool and its current state.
    #[must_use]
    pub fn new(pool: &Pool, state: &PoolState) -> Self {
        Self {
            pool_id: pool.id,
            kind: pool.kind,
            name: pool.metadata.name.clone(),
            total: pool.total,
            remaining: state.remaining(),
            created_at: pool.created_at,
        }
    }
}

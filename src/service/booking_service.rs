//! Booking service: orchestrates pool and booking operations and emits events.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::pool::MAX_POOL_NAME_LEN;
use crate::domain::{
    BookingRecord, BookingRequest, EventBus, InventoryEvent, Pool, PoolId, PoolKind, PoolMetadata,
    PoolSummary, Seat, SeatStatus,
};
use crate::error::InventoryError;
use crate::inventory::{Allocated, BookingCoordinator, InventoryStore};

/// Number of records returned by recent-bookings queries without a limit.
pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// Operational limits applied by [`BookingService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimits {
    /// Largest pool that may be created.
    pub max_pool_size: u32,
    /// Upper bound for recent-bookings limits; larger requests are clamped.
    pub max_recent_limit: usize,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            max_pool_size: 10_000,
            max_recent_limit: 100,
        }
    }
}

/// A pool with its current occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolDetails {
    /// Immutable pool description.
    pub pool: Pool,
    /// Units booked so far.
    pub booked: u32,
    /// Units still available.
    pub remaining: u32,
    /// Number of committed bookings.
    pub bookings: usize,
}

/// Aggregates for one pool kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct KindTotals {
    /// Number of pools.
    pub pools: usize,
    /// Number of committed bookings.
    pub bookings: usize,
    /// Sum of pool sizes.
    pub capacity: u64,
    /// Units booked across all pools.
    pub booked: u64,
}

/// Dashboard figures across all pools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardSummary {
    /// Conference (capacity pool) totals.
    pub capacity: KindTotals,
    /// Bus (slotted pool) totals.
    pub slotted: KindTotals,
}

/// Orchestration layer for all inventory operations.
///
/// Owns the [`BookingCoordinator`] (and through it the
/// [`InventoryStore`]) plus the [`EventBus`]. Every mutation follows the
/// same pattern: commit through the core, then publish events describing
/// what was committed.
#[derive(Debug, Clone)]
pub struct BookingService {
    coordinator: BookingCoordinator,
    event_bus: EventBus,
    limits: ServiceLimits,
}

impl BookingService {
    /// Creates a new `BookingService`.
    #[must_use]
    pub fn new(store: Arc<InventoryStore>, event_bus: EventBus, limits: ServiceLimits) -> Self {
        Self {
            coordinator: BookingCoordinator::new(store),
            event_bus,
            limits,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the underlying [`InventoryStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<InventoryStore> {
        self.coordinator.store()
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> ServiceLimits {
        self.limits
    }

    /// Creates a pool of `size` tickets or seats.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidRequest`] if `size` is zero or above
    /// the configured maximum, or if the name is empty or too long;
    /// [`InventoryError::StorageFailure`] if the pool cannot be recorded.
    pub async fn create_pool(
        &self,
        kind: PoolKind,
        size: u32,
        metadata: PoolMetadata,
    ) -> Result<Pool, InventoryError> {
        if size == 0 || size > self.limits.max_pool_size {
            return Err(InventoryError::InvalidRequest(format!(
                "size must be between 1 and {}",
                self.limits.max_pool_size
            )));
        }
        let name = metadata.name.trim();
        if name.is_empty() || name.chars().count() > MAX_POOL_NAME_LEN {
            return Err(InventoryError::InvalidRequest(format!(
                "name must be between 1 and {MAX_POOL_NAME_LEN} characters"
            )));
        }
        let metadata = PoolMetadata {
            name: name.to_string(),
            attributes: metadata.attributes,
        };

        let pool = Pool::new(kind, size, metadata);
        self.store().insert(pool.clone()).await?;

        let _ = self.event_bus.publish(InventoryEvent::PoolCreated {
            pool_id: pool.id,
            kind,
            name: pool.metadata.name.clone(),
            total: size,
            timestamp: pool.created_at,
        });

        tracing::info!(pool_id = %pool.id, kind = kind.as_str(), total = size, "pool created");
        Ok(pool)
    }

    /// Books tickets or seats.
    ///
    /// Publishes [`InventoryEvent::BookingConfirmed`] and, when the booking
    /// took the last unit, [`InventoryEvent::PoolSoldOut`]. Both are sent
    /// while the pool is still locked, so subscribers see one pool's
    /// `remaining` strictly decrease.
    ///
    /// # Errors
    ///
    /// Any rejection from [`BookingCoordinator::submit`].
    pub async fn book(&self, request: &BookingRequest) -> Result<Allocated, InventoryError> {
        let bus = self.event_bus.clone();
        let outcome = self
            .coordinator
            .submit_then(request, move |record| publish_commit(&bus, record))
            .await;
        let allocated = match outcome {
            Ok(allocated) => allocated,
            Err(err) => {
                if !err.status_code().is_server_error() {
                    tracing::debug!(pool_id = %request.pool_id, reason = err.reason(), "booking rejected");
                }
                return Err(err);
            }
        };

        let record = &allocated.record;
        tracing::info!(
            pool_id = %record.pool_id,
            booking_id = %record.booking_id,
            units = record.allocated_units(),
            remaining = allocated.remaining,
            "booking committed"
        );
        Ok(allocated)
    }

    /// Returns up to `limit` bookings of one pool, newest first.
    ///
    /// `None` means [`DEFAULT_RECENT_LIMIT`]; values above the configured
    /// maximum are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::NotFound`] if the pool does not exist.
    pub async fn recent_bookings(
        &self,
        pool_id: PoolId,
        limit: Option<usize>,
    ) -> Result<Vec<BookingRecord>, InventoryError> {
        let slot = self.store().slot(pool_id).await?;
        Ok(slot.recent_bookings(self.clamp_limit(limit)).await)
    }

    /// Returns up to `limit` bookings across all pools, newest first.
    pub async fn all_recent_bookings(&self, limit: Option<usize>) -> Vec<BookingRecord> {
        let limit = self.clamp_limit(limit);
        let mut merged = Vec::new();
        for slot in self.store().slots().await {
            merged.extend(slot.recent_bookings(limit).await);
        }
        merged.sort_by_key(|r| Reverse(r.booked_at));
        merged.truncate(limit);
        merged
    }

    /// Lists pool summaries, oldest first, optionally filtered by kind.
    pub async fn list_pools(&self, kind: Option<PoolKind>) -> Vec<PoolSummary> {
        let mut summaries = Vec::new();
        for slot in self.store().slots().await {
            if kind.is_none_or(|k| k == slot.pool().kind) {
                summaries.push(slot.summary().await);
            }
        }
        summaries
    }

    /// Returns a pool with its current occupancy.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::NotFound`] if the pool does not exist.
    pub async fn get_pool(&self, pool_id: PoolId) -> Result<PoolDetails, InventoryError> {
        let slot = self.store().slot(pool_id).await?;
        let (booked, remaining, bookings) = slot
            .read(|state, ledger| (state.booked(), state.remaining(), ledger.len()))
            .await;
        Ok(PoolDetails {
            pool: slot.pool().clone(),
            booked,
            remaining,
            bookings,
        })
    }

    /// Returns the seat map of a slotted pool.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::NotFound`] if the pool does not exist, or
    /// [`InventoryError::InvalidRequest`] if it is a capacity pool.
    pub async fn seat_map(
        &self,
        pool_id: PoolId,
        only_available: bool,
    ) -> Result<Vec<Seat>, InventoryError> {
        let slot = self.store().slot(pool_id).await?;
        if slot.pool().kind != PoolKind::Slotted {
            return Err(InventoryError::InvalidRequest(format!(
                "pool {pool_id} has no seat map"
            )));
        }
        let seats = slot.state().await.seats();
        Ok(if only_available {
            seats
                .into_iter()
                .filter(|s| s.status == SeatStatus::Available)
                .collect()
        } else {
            seats
        })
    }

    /// Computes dashboard totals per pool kind.
    pub async fn dashboard(&self) -> DashboardSummary {
        let mut summary = DashboardSummary::default();
        for slot in self.store().slots().await {
            let (bookings, booked) = slot
                .read(|_, ledger| (ledger.len(), ledger.units_booked()))
                .await;
            let totals = match slot.pool().kind {
                PoolKind::Capacity => &mut summary.capacity,
                PoolKind::Slotted => &mut summary.slotted,
            };
            totals.pools += 1;
            totals.bookings += bookings;
            totals.capacity += u64::from(slot.pool().total);
            totals.booked += booked;
        }
        summary
    }

    fn clamp_limit(&self, limit: Option<usize>) -> usize {
        limit
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .min(self.limits.max_recent_limit)
    }
}

/// Publishes the events of one committed booking.
fn publish_commit(bus: &EventBus, record: &BookingRecord) {
    let _ = bus.publish(InventoryEvent::BookingConfirmed {
        pool_id: record.pool_id,
        booking_id: record.booking_id,
        customer: record.customer.clone(),
        allocation: record.allocation.clone(),
        remaining: record.remaining_after,
        timestamp: record.booked_at,
    });
    if record.remaining_after == 0 {
        tracing::info!(pool_id = %record.pool_id, "pool sold out");
        let _ = bus.publish(InventoryEvent::PoolSoldOut {
            pool_id: record.pool_id,
            timestamp: Utc::now(),
        });
    }
}

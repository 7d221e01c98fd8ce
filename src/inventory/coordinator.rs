//! Per-pool serialization of booking attempts.

use std::sync::Arc;

use super::engine::{Allocated, AllocationEngine};
use super::store::InventoryStore;
use crate::domain::{BookingRecord, BookingRequest};
use crate::error::InventoryError;

/// Sequences concurrent booking attempts into a total order per pool.
///
/// A request waits only for requests on the same pool; requests on
/// different pools never contend. Each attempt holds the pool's permit for
/// exactly one allocation and never takes a second lock, so the core cannot
/// deadlock.
#[derive(Debug, Clone)]
pub struct BookingCoordinator {
    store: Arc<InventoryStore>,
    engine: AllocationEngine,
}

impl BookingCoordinator {
    /// Creates a coordinator over `store`.
    #[must_use]
    pub fn new(store: Arc<InventoryStore>) -> Self {
        Self {
            store,
            engine: AllocationEngine::new(),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.store
    }

    /// Runs one booking attempt to completion.
    ///
    /// The request shape is validated before the pool is even looked up, so
    /// a malformed request never touches pool state. No retries are made;
    /// a lost race is reported as a typed rejection.
    ///
    /// # Errors
    ///
    /// [`InventoryError::InvalidRequest`], [`InventoryError::NotFound`],
    /// [`InventoryError::InsufficientCapacity`],
    /// [`InventoryError::SeatUnavailable`], or
    /// [`InventoryError::StorageFailure`].
    pub async fn submit(&self, request: &BookingRequest) -> Result<Allocated, InventoryError> {
        self.submit_then(request, |_| {}).await
    }

    /// Like [`BookingCoordinator::submit`], calling `on_commit` with the
    /// committed record while the pool is still locked. Hooks on one pool
    /// therefore run in commit order.
    ///
    /// # Errors
    ///
    /// Same as [`BookingCoordinator::submit`].
    pub async fn submit_then<F>(
        &self,
        request: &BookingRequest,
        on_commit: F,
    ) -> Result<Allocated, InventoryError>
    where
        F: FnOnce(&BookingRecord) + Send + 'static,
    {
        self.engine.validate(request)?;
        let slot = self.store.slot(request.pool_id).await?;
        let permit = slot.lock().await;
        self.engine
            .allocate(&self.store, permit, request, on_commit)
            .await
    }
}

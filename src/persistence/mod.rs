//! Persistence layer: durable pool state and booking ledger.
//!
//! [`PersistenceBackend`] is the write-through target of
//! [`crate::inventory::InventoryStore`]. Each booking commit is one atomic
//! unit covering the pool state change and the ledger row; a backend must
//! either apply both or neither.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{BookingRecord, Pool, PoolState};
use crate::error::InventoryError;

pub use memory::MemoryBackend;
pub use postgres::PostgresBackend;

/// Everything recorded about one pool, as loaded at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPool {
    /// Pool description.
    pub pool: Pool,
    /// Last durably committed state.
    pub state: PoolState,
    /// Ledger in commit order, oldest first.
    pub bookings: Vec<BookingRecord>,
}

/// Durable storage for pools and their ledgers.
#[async_trait]
pub trait PersistenceBackend: Send + Sync + std::fmt::Debug {
    /// Records a newly created pool with its initial state.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StorageFailure`] if the write fails.
    async fn insert_pool(&self, pool: &Pool, state: &PoolState) -> Result<(), InventoryError>;

    /// Atomically records `next_state` for `pool` and appends `record` to
    /// its ledger. `record.allocation` is the mutation being committed.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StorageFailure`] if the write fails; in that
    /// case nothing was recorded.
    async fn commit_booking(
        &self,
        pool: &Pool,
        next_state: &PoolState,
        record: &BookingRecord,
    ) -> Result<(), InventoryError>;

    /// Loads every pool, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StorageFailure`] if the read fails or the
    /// stored data cannot be decoded.
    async fn load(&self) -> Result<Vec<StoredPool>, InventoryError>;
}

//! Process-local backend used when persistence is disabled and in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{PersistenceBackend, StoredPool};
use crate::domain::{BookingRecord, Pool, PoolId, PoolState};
use crate::error::InventoryError;

/// In-memory [`PersistenceBackend`].
///
/// Survives a rebuild of [`crate::inventory::InventoryStore`] within the
/// same process, which is enough to exercise recovery. Each commit is
/// applied under a single lock, so it is all-or-nothing.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pools: Mutex<HashMap<PoolId, StoredPool>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_pools<T>(
        &self,
        f: impl FnOnce(&mut HashMap<PoolId, StoredPool>) -> Result<T, InventoryError>,
    ) -> Result<T, InventoryError> {
        let mut pools = self
            .pools
            .lock()
            .map_err(|_| InventoryError::StorageFailure("memory backend lock poisoned".to_string()))?;
        f(&mut pools)
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    async fn insert_pool(&self, pool: &Pool, state: &PoolState) -> Result<(), InventoryError> {
        self.with_pools(|pools| {
            if pools.contains_key(&pool.id) {
                return Err(InventoryError::StorageFailure(format!(
                    "pool {} already stored",
                    pool.id
                )));
            }
            pools.insert(
                pool.id,
                StoredPool {
                    pool: pool.clone(),
                    state: state.clone(),
                    bookings: Vec::new(),
                },
            );
            Ok(())
        })
    }

    async fn commit_booking(
        &self,
        pool: &Pool,
        next_state: &PoolState,
        record: &BookingRecord,
    ) -> Result<(), InventoryError> {
        self.with_pools(|pools| {
            let stored = pools.get_mut(&pool.id).ok_or_else(|| {
                InventoryError::StorageFailure(format!("pool {} is not stored", pool.id))
            })?;
            stored.state = next_state.clone();
            stored.bookings.push(record.clone());
            Ok(())
        })
    }

    async fn load(&self) -> Result<Vec<StoredPool>, InventoryError> {
        self.with_pools(|pools| {
            let mut stored: Vec<StoredPool> = pools.values().cloned().collect();
            stored.sort_by_key(|s| (s.pool.created_at, s.pool.id));
            Ok(stored)
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Allocation, BookingId, Customer, PoolKind, PoolMetadata};
    use chrono::Utc;

    #[tokio::test]
    async fn commit_is_visible_on_load() {
        let backend = MemoryBackend::new();
        let pool = Pool::new(PoolKind::Capacity, 10, PoolMetadata::named("The Conf"));
        tokio_test::assert_ok!(backend.insert_pool(&pool, &pool.initial_state()).await);

        let allocation = Allocation::Tickets { quantity: 4 };
        let Ok(next) = pool.initial_state().apply(&allocation) else {
            panic!("allocation should fit");
        };
        let record = BookingRecord {
            booking_id: BookingId::new(),
            pool_id: pool.id,
            customer: Customer::new("Ada", "Lovelace", "ada@example.com"),
            allocation,
            remaining_after: 6,
            booked_at: Utc::now(),
        };
        tokio_test::assert_ok!(backend.commit_booking(&pool, &next, &record).await);

        let Ok(loaded) = backend.load().await else {
            panic!("load failed");
        };
        let [stored] = loaded.as_slice() else {
            panic!("expected exactly one pool");
        };
        assert_eq!(stored.state.remaining(), 6);
        assert_eq!(stored.bookings, vec![record]);
    }

    #[tokio::test]
    async fn commit_for_unknown_pool_fails() {
        let backend = MemoryBackend::new();
        let pool = Pool::new(PoolKind::Capacity, 1, PoolMetadata::named("Ghost"));
        let record = BookingRecord {
            booking_id: BookingId::new(),
            pool_id: pool.id,
            customer: Customer::new("Ada", "Lovelace", "ada@example.com"),
            allocation: Allocation::Tickets { quantity: 1 },
            remaining_after: 0,
            booked_at: Utc::now(),
        };
        let result = backend
            .commit_booking(&pool, &pool.initial_state(), &record)
            .await;
        tokio_test::assert_err!(result);
    }
}

//! Live pool state with per-pool fine-grained locking.
//!
//! [`InventoryStore`] keeps every pool in a `HashMap` whose values are
//! individually locked [`PoolSlot`]s. The outer map lock is held only for
//! lookups and inserts; all booking traffic contends on the slot of the pool
//! it targets and nothing else.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::ledger::BookingLedger;
use crate::domain::{BookingRecord, Pool, PoolId, PoolState, PoolSummary};
use crate::error::InventoryError;
use crate::persistence::{PersistenceBackend, StoredPool};

/// Committed state of a pool and the ledger that produced it. Always read
/// and written together.
#[derive(Debug)]
struct Committed {
    state: PoolState,
    ledger: BookingLedger,
}

/// One pool together with its live state, its ledger, and its commit gate.
///
/// State and ledger are only written through [`InventoryStore::commit`],
/// which requires a [`CommitPermit`] obtained from [`PoolSlot::lock`].
#[derive(Debug)]
pub struct PoolSlot {
    pool: Pool,
    committed: RwLock<Committed>,
    commit_gate: Arc<Mutex<()>>,
}

impl PoolSlot {
    fn new(pool: Pool, state: PoolState, ledger: BookingLedger) -> Self {
        Self {
            pool,
            committed: RwLock::new(Committed { state, ledger }),
            commit_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Immutable pool description.
    #[must_use]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Snapshot of the last committed state.
    pub async fn state(&self) -> PoolState {
        self.committed.read().await.state.clone()
    }

    /// Units still available as of the last commit.
    pub async fn remaining(&self) -> u32 {
        self.committed.read().await.state.remaining()
    }

    /// Up to `limit` committed bookings, newest first.
    pub async fn recent_bookings(&self, limit: usize) -> Vec<BookingRecord> {
        self.committed.read().await.ledger.query(limit)
    }

    /// Number of committed bookings.
    pub async fn booking_count(&self) -> usize {
        self.committed.read().await.ledger.len()
    }

    /// Runs `f` on a consistent view of state and ledger.
    pub async fn read<T>(&self, f: impl FnOnce(&PoolState, &BookingLedger) -> T) -> T {
        let committed = self.committed.read().await;
        f(&committed.state, &committed.ledger)
    }

    /// Summary for list endpoints.
    pub async fn summary(&self) -> PoolSummary {
        PoolSummary::new(&self.pool, &self.committed.read().await.state)
    }

    /// Acquires exclusive access to this pool's mutation path.
    ///
    /// Waiters are served first-come-first-served (`tokio::sync::Mutex` is
    /// fair). Reads are not blocked by a held permit, only by the brief
    /// in-memory swap at the end of a commit.
    pub async fn lock(self: &Arc<Self>) -> CommitPermit {
        CommitPermit {
            slot: Arc::clone(self),
            _guard: Arc::clone(&self.commit_gate).lock_owned().await,
        }
    }
}

/// Proof of exclusive access to one pool's mutation path.
///
/// Owned, so it can travel into the task that finishes a commit.
#[derive(Debug)]
pub struct CommitPermit {
    slot: Arc<PoolSlot>,
    _guard: OwnedMutexGuard<()>,
}

impl CommitPermit {
    /// The pool this permit guards.
    #[must_use]
    pub fn pool(&self) -> &Pool {
        &self.slot.pool
    }

    /// The committed state. Stable for the lifetime of the permit.
    pub async fn state(&self) -> PoolState {
        self.slot.state().await
    }
}

/// Durable owner of every pool's live state. The only writer of truth.
#[derive(Debug)]
pub struct InventoryStore {
    pools: RwLock<HashMap<PoolId, Arc<PoolSlot>>>,
    backend: Arc<dyn PersistenceBackend>,
}

impl InventoryStore {
    /// Creates an empty store writing through to `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn PersistenceBackend>) -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
            backend,
        }
    }

    /// Rebuilds the store from everything `backend` has durably recorded.
    ///
    /// Each pool's state is reconciled against its ledger: the ledger is
    /// replayed onto a fresh state and, if the stored state disagrees, the
    /// replayed one wins.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StorageFailure`] if loading fails or a
    /// ledger cannot be replayed (for example a seat booked twice).
    pub async fn recover(backend: Arc<dyn PersistenceBackend>) -> Result<Self, InventoryError> {
        let stored = backend.load().await?;
        let store = Self::new(backend);
        {
            let mut map = store.pools.write().await;
            for entry in stored {
                let state = reconcile(&entry)?;
                let pool_id = entry.pool.id;
                let slot = PoolSlot::new(entry.pool, state, BookingLedger::from_records(entry.bookings));
                map.insert(pool_id, Arc::new(slot));
            }
            tracing::info!(pools = map.len(), "inventory recovered");
        }
        Ok(store)
    }

    /// Durably records a new pool and makes it bookable.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidRequest`] if a pool with the same ID
    /// already exists, or [`InventoryError::StorageFailure`] if the backend
    /// write fails.
    pub async fn insert(&self, pool: Pool) -> Result<PoolId, InventoryError> {
        let pool_id = pool.id;
        if self.pools.read().await.contains_key(&pool_id) {
            return Err(InventoryError::InvalidRequest(format!(
                "pool {pool_id} already exists"
            )));
        }
        let state = pool.initial_state();
        self.backend.insert_pool(&pool, &state).await?;
        let mut map = self.pools.write().await;
        map.insert(
            pool_id,
            Arc::new(PoolSlot::new(pool, state, BookingLedger::new())),
        );
        Ok(pool_id)
    }

    /// Returns the slot of a pool.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::NotFound`] if no pool with the given ID
    /// exists.
    pub async fn slot(&self, pool_id: PoolId) -> Result<Arc<PoolSlot>, InventoryError> {
        let map = self.pools.read().await;
        map.get(&pool_id)
            .cloned()
            .ok_or(InventoryError::NotFound(pool_id))
    }

    /// Returns the last committed state of a pool.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::NotFound`] if no pool with the given ID
    /// exists.
    pub async fn get(&self, pool_id: PoolId) -> Result<PoolState, InventoryError> {
        Ok(self.slot(pool_id).await?.state().await)
    }

    /// Applies a validated booking: durable write first, then the in-memory
    /// swap of state and ledger, then `on_commit`.
    ///
    /// The three steps run in a spawned task that owns `permit`, so dropping
    /// the returned future cannot stop a commit halfway: once the backend has
    /// the booking, memory gets it too. `on_commit` runs before the permit is
    /// released, so anything it publishes is ordered like the commits. If the
    /// backend fails nothing in memory changes and `on_commit` is not called.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StorageFailure`] when the durable write
    /// fails, or [`InventoryError::Internal`] if the commit task panics.
    pub async fn commit<F>(
        &self,
        permit: CommitPermit,
        next_state: PoolState,
        record: BookingRecord,
        on_commit: F,
    ) -> Result<BookingRecord, InventoryError>
    where
        F: FnOnce(&BookingRecord) + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let task = tokio::spawn(async move {
            let slot = Arc::clone(&permit.slot);
            if let Err(err) = backend.commit_booking(&slot.pool, &next_state, &record).await {
                tracing::error!(pool_id = %slot.pool.id, error = %err, "commit failed; pool state unchanged");
                return Err(err);
            }
            {
                let mut committed = slot.committed.write().await;
                committed.state = next_state;
                committed.ledger.append(record.clone());
            }
            on_commit(&record);
            drop(permit);
            Ok(record)
        });
        match task.await {
            Ok(result) => result,
            Err(err) => Err(InventoryError::Internal(format!("commit task failed: {err}"))),
        }
    }

    /// Returns every slot, oldest pool first.
    pub async fn slots(&self) -> Vec<Arc<PoolSlot>> {
        let map = self.pools.read().await;
        let mut slots: Vec<Arc<PoolSlot>> = map.values().cloned().collect();
        slots.sort_by_key(|s| (s.pool.created_at, s.pool.id));
        slots
    }

    /// Returns the number of pools in the store.
    pub async fn len(&self) -> usize {
        self.pools.read().await.len()
    }

    /// Returns `true` if the store contains no pools.
    pub async fn is_empty(&self) -> bool {
        self.pools.read().await.is_empty()
    }
}

/// Replays a pool's ledger and checks it against the stored state.
fn reconcile(entry: &StoredPool) -> Result<PoolState, InventoryError> {
    let mut replayed = entry.pool.initial_state();
    for record in &entry.bookings {
        replayed = replayed.apply(&record.allocation).map_err(|err| {
            InventoryError::StorageFailure(format!(
                "ledger of pool {} cannot be replayed at booking {}: {err}",
                entry.pool.id, record.booking_id
            ))
        })?;
    }
    if replayed != entry.state {
        tracing::warn!(
            pool_id = %entry.pool.id,
            stored_remaining = entry.state.remaining(),
            ledger_remaining = replayed.remaining(),
            "stored pool state disagrees with ledger; using ledger"
        );
    }
    Ok(replayed)
}

//! Booking-core guarantees under concurrency, storage failure, and restart.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use seatbook::domain::{
    BookingRecord, BookingRequest, Customer, EventBus, InventoryEvent, Pool, PoolId, PoolKind,
    PoolMetadata, PoolState, SeatStatus,
};
use seatbook::error::InventoryError;
use seatbook::inventory::InventoryStore;
use seatbook::persistence::{MemoryBackend, PersistenceBackend, StoredPool};
use seatbook::service::{BookingService, ServiceLimits};

fn guest(n: usize) -> Customer {
    Customer::new(format!("Guest{n}"), "Traveller", format!("guest{n}@example.com"))
}

fn service_over(backend: Arc<dyn PersistenceBackend>) -> Arc<BookingService> {
    let store = Arc::new(InventoryStore::new(backend));
    Arc::new(BookingService::new(store, EventBus::new(1024), ServiceLimits::default()))
}

async fn create(service: &BookingService, kind: PoolKind, size: u32) -> PoolId {
    let Ok(pool) = service
        .create_pool(kind, size, PoolMetadata::named("Race Day"))
        .await
    else {
        panic!("pool should be created");
    };
    pool.id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_ticket_requests_cannot_both_fit() {
    for _ in 0..50 {
        let service = service_over(Arc::new(MemoryBackend::new()));
        let pool_id = create(&service, PoolKind::Capacity, 2).await;

        let a = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.book(&BookingRequest::tickets(pool_id, guest(1), 1)).await })
        };
        let b = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.book(&BookingRequest::tickets(pool_id, guest(2), 2)).await })
        };
        let (Ok(a), Ok(b)) = (a.await, b.await) else {
            panic!("tasks should not panic");
        };

        assert!(a.is_ok() != b.is_ok(), "exactly one booking must win: {a:?} {b:?}");
        let remaining = match (&a, &b) {
            (Ok(won), Err(InventoryError::InsufficientCapacity { requested: 2, remaining: 1 })) => {
                won.remaining
            }
            (Err(InventoryError::InsufficientCapacity { requested: 1, remaining: 0 }), Ok(won)) => {
                won.remaining
            }
            other => panic!("unexpected outcome pair: {other:?}"),
        };
        let Ok(details) = service.get_pool(pool_id).await else {
            panic!("pool should exist");
        };
        assert_eq!(details.remaining, remaining);
        assert_eq!(details.bookings, 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_seat_has_exactly_one_winner() {
    let service = service_over(Arc::new(MemoryBackend::new()));
    let pool_id = create(&service, PoolKind::Slotted, 4).await;

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.book(&BookingRequest::seats(pool_id, guest(n), vec![2])).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        let Ok(outcome) = handle.await else {
            panic!("task should not panic");
        };
        match outcome {
            Ok(allocated) => {
                winners += 1;
                assert_eq!(allocated.remaining, 3);
            }
            Err(InventoryError::SeatUnavailable(2)) => {}
            Err(other) => panic!("unexpected rejection: {other:?}"),
        }
    }
    assert_eq!(winners, 1);

    let Ok(seats) = service.seat_map(pool_id, false).await else {
        panic!("seat map should load");
    };
    let booked: Vec<u32> = seats
        .iter()
        .filter(|s| s.status == SeatStatus::Booked)
        .map(|s| s.seat_number)
        .collect();
    assert_eq!(booked, vec![2]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn committed_bookings_form_a_linear_history() {
    let total = 100;
    let service = service_over(Arc::new(MemoryBackend::new()));
    let pool_id = create(&service, PoolKind::Capacity, total).await;

    let handles: Vec<_> = (0..80)
        .map(|n| {
            let service = Arc::clone(&service);
            let quantity = u32::try_from(n % 3 + 1).unwrap_or(1);
            tokio::spawn(async move {
                service
                    .book(&BookingRequest::tickets(pool_id, guest(n), quantity))
                    .await
                    .map(|a| (quantity, a.remaining))
            })
        })
        .collect();

    let mut successes = Vec::new();
    for handle in handles {
        let Ok(outcome) = handle.await else {
            panic!("task should not panic");
        };
        match outcome {
            Ok(pair) => successes.push(pair),
            Err(InventoryError::InsufficientCapacity { .. }) => {}
            Err(other) => panic!("unexpected rejection: {other:?}"),
        }
    }

    // Ordering successes by decreasing `remaining` must reproduce the
    // commit order: each remaining equals total minus the running sum.
    successes.sort_by_key(|&(_, remaining)| std::cmp::Reverse(remaining));
    let distinct: BTreeSet<u32> = successes.iter().map(|&(_, r)| r).collect();
    assert_eq!(distinct.len(), successes.len());
    let mut sold = 0;
    for (quantity, remaining) in &successes {
        sold += quantity;
        assert_eq!(*remaining, total - sold);
    }

    let Ok(details) = service.get_pool(pool_id).await else {
        panic!("pool should exist");
    };
    assert_eq!(details.booked, sold);
    assert_eq!(details.bookings, successes.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn subscribers_see_remaining_strictly_decrease() {
    let service = service_over(Arc::new(MemoryBackend::new()));
    let pool_id = create(&service, PoolKind::Capacity, 20).await;
    let mut rx = service.event_bus().subscribe();

    let handles: Vec<_> = (0..30)
        .map(|n| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.book(&BookingRequest::tickets(pool_id, guest(n), 1)).await })
        })
        .collect();
    for handle in handles {
        let Ok(_) = handle.await else {
            panic!("task should not panic");
        };
    }

    let mut seen = Vec::new();
    let mut sold_out_after = None;
    while let Ok(event) = rx.try_recv() {
        match event {
            InventoryEvent::BookingConfirmed { remaining, .. } => {
                assert!(sold_out_after.is_none(), "confirmation after sold-out");
                seen.push(remaining);
            }
            InventoryEvent::PoolSoldOut { .. } => sold_out_after = Some(seen.len()),
            InventoryEvent::PoolCreated { .. } => {}
        }
    }
    assert_eq!(seen, (0..20).rev().collect::<Vec<u32>>());
    assert_eq!(sold_out_after, Some(20));
}

#[tokio::test]
async fn invalid_customer_changes_nothing() {
    let service = service_over(Arc::new(MemoryBackend::new()));
    let pool_id = create(&service, PoolKind::Capacity, 5).await;

    let request = BookingRequest::tickets(pool_id, Customer::new("", "Doe", "jd@example.com"), 1);
    let Err(InventoryError::InvalidRequest(_)) = service.book(&request).await else {
        panic!("empty first name must be rejected");
    };

    let Ok(details) = service.get_pool(pool_id).await else {
        panic!("pool should exist");
    };
    assert_eq!(details.remaining, 5);
    assert_eq!(details.bookings, 0);
}

/// Backend whose booking commits fail while `failing` is set.
#[derive(Debug, Default)]
struct FlakyBackend {
    inner: MemoryBackend,
    failing: AtomicBool,
}

#[async_trait]
impl PersistenceBackend for FlakyBackend {
    async fn insert_pool(&self, pool: &Pool, state: &PoolState) -> Result<(), InventoryError> {
        self.inner.insert_pool(pool, state).await
    }

    async fn commit_booking(
        &self,
        pool: &Pool,
        next_state: &PoolState,
        record: &BookingRecord,
    ) -> Result<(), InventoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(InventoryError::StorageFailure("disk full".to_string()));
        }
        self.inner.commit_booking(pool, next_state, record).await
    }

    async fn load(&self) -> Result<Vec<StoredPool>, InventoryError> {
        self.inner.load().await
    }
}

#[tokio::test]
async fn storage_failure_leaves_state_and_ledger_untouched() {
    let backend = Arc::new(FlakyBackend::default());
    let service = service_over(Arc::clone(&backend) as Arc<dyn PersistenceBackend>);
    let pool_id = create(&service, PoolKind::Slotted, 3).await;

    let Ok(_) = service.book(&BookingRequest::seats(pool_id, guest(1), vec![1])).await else {
        panic!("first booking should commit");
    };

    backend.failing.store(true, Ordering::SeqCst);
    let Err(err) = service.book(&BookingRequest::seats(pool_id, guest(2), vec![2])).await else {
        panic!("booking must fail while storage is down");
    };
    assert_eq!(err.error_code(), 3001);
    assert!(err.status_code().is_server_error());
    assert!(!err.to_body().message.contains("disk full"));

    let Ok(details) = service.get_pool(pool_id).await else {
        panic!("pool should exist");
    };
    assert_eq!(details.remaining, 2);
    assert_eq!(details.bookings, 1);

    backend.failing.store(false, Ordering::SeqCst);
    let Ok(allocated) = service.book(&BookingRequest::seats(pool_id, guest(2), vec![2])).await else {
        panic!("seat 2 must still be free after the failed commit");
    };
    assert_eq!(allocated.remaining, 1);
}

#[tokio::test]
async fn restart_restores_pools_and_ledgers() {
    let backend: Arc<dyn PersistenceBackend> = Arc::new(MemoryBackend::new());
    let service = service_over(Arc::clone(&backend));
    let conf = create(&service, PoolKind::Capacity, 10).await;
    let bus = create(&service, PoolKind::Slotted, 4).await;

    for (n, quantity) in [(1, 3), (2, 4)] {
        let Ok(_) = service.book(&BookingRequest::tickets(conf, guest(n), quantity)).await else {
            panic!("ticket booking should commit");
        };
    }
    let Ok(_) = service.book(&BookingRequest::seats(bus, guest(3), vec![1, 4])).await else {
        panic!("seat booking should commit");
    };

    let Ok(store) = InventoryStore::recover(backend).await else {
        panic!("recovery should succeed");
    };
    let restarted = BookingService::new(Arc::new(store), EventBus::new(16), ServiceLimits::default());

    let Ok(details) = restarted.get_pool(conf).await else {
        panic!("conference should survive restart");
    };
    assert_eq!(details.remaining, 3);
    assert_eq!(details.bookings, 2);

    let Err(InventoryError::SeatUnavailable(4)) = restarted
        .book(&BookingRequest::seats(bus, guest(4), vec![4]))
        .await
    else {
        panic!("seat 4 must stay booked after restart");
    };
    let Ok(recent) = restarted.recent_bookings(conf, None).await else {
        panic!("ledger should survive restart");
    };
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].remaining_after, 3);
}

//! Append-only record of committed bookings for one pool.
//!
//! The ledger answers "recent bookings" queries and is replayed at startup
//! to reconcile the live pool state. It never takes part in capacity
//! decisions.

use crate::domain::BookingRecord;

/// Per-pool append-only booking log, oldest entry first.
///
/// The ledger has no lock of its own: it lives next to the pool state under
/// the slot's lock in [`super::PoolSlot`], so a reader sees a record exactly
/// when it sees the state change that record describes. Appends happen only
/// from [`super::InventoryStore::commit`], after the booking is durable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingLedger {
    records: Vec<BookingRecord>,
}

impl BookingLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from records loaded in commit order.
    #[must_use]
    pub fn from_records(records: Vec<BookingRecord>) -> Self {
        Self { records }
    }

    pub(crate) fn append(&mut self, record: BookingRecord) {
        self.records.push(record);
    }

    /// Returns up to `limit` records, newest first.
    #[must_use]
    pub fn query(&self, limit: usize) -> Vec<BookingRecord> {
        self.records.iter().rev().take(limit).cloned().collect()
    }

    /// Number of committed bookings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing has been booked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of allocated units across all records.
    #[must_use]
    pub fn units_booked(&self) -> u64 {
        self.records
            .iter()
            .map(|r| u64::from(r.allocated_units()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Allocation, BookingId, Customer, PoolId};
    use chrono::Utc;

    fn record(pool_id: PoolId, quantity: u32) -> BookingRecord {
        BookingRecord {
            booking_id: BookingId::new(),
            pool_id,
            customer: Customer::new("Grace", "Hopper", "grace@example.com"),
            allocation: Allocation::Tickets { quantity },
            remaining_after: 0,
            booked_at: Utc::now(),
        }
    }

    #[test]
    fn query_returns_newest_first() {
        let pool_id = PoolId::new();
        let mut ledger = BookingLedger::new();
        for q in 1..=3 {
            ledger.append(record(pool_id, q));
        }

        let recent = ledger.query(2);
        let quantities: Vec<u32> = recent.iter().map(BookingRecord::allocated_units).collect();
        assert_eq!(quantities, vec![3, 2]);
    }

    #[test]
    fn query_is_idempotent_without_appends() {
        let pool_id = PoolId::new();
        let ledger = BookingLedger::from_records(vec![record(pool_id, 1), record(pool_id, 4)]);
        assert_eq!(ledger.query(10), ledger.query(10));
        assert_eq!(ledger.units_booked(), 5);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn zero_limit_returns_nothing() {
        let ledger = BookingLedger::from_records(vec![record(PoolId::new(), 1)]);
        assert!(ledger.query(0).is_empty());
        assert!(!ledger.is_empty());
    }
}

//! Booking validation and allocation.
//!
//! [`AllocationEngine`] is the authority on whether a booking may be
//! granted. Any validation a client performs is advisory; every request is
//! re-checked here before it can reach pool state.

use chrono::Utc;

use super::store::{CommitPermit, InventoryStore};
use crate::domain::{
    Allocation, BookingId, BookingRecord, BookingRequest, Customer, Pool, PoolKind, PoolState,
};
use crate::error::InventoryError;

/// Longest accepted first or last name, in characters.
pub const MAX_NAME_LEN: usize = 50;

/// Longest accepted email address, in bytes.
pub const MAX_EMAIL_LEN: usize = 254;

/// A validated booking ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    /// Pool state after the booking.
    pub next_state: PoolState,
    /// Ledger entry describing the booking.
    pub record: BookingRecord,
}

impl AllocationPlan {
    /// Units remaining once the plan is committed.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.next_state.remaining()
    }
}

/// Outcome of a committed allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocated {
    /// The ledger entry that was written.
    pub record: BookingRecord,
    /// Units remaining in the pool after this booking.
    pub remaining: u32,
}

/// Validates booking requests and applies them to pool state.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationEngine;

impl AllocationEngine {
    /// Creates an engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks the request shape without looking at any pool state.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidRequest`] when a customer field is
    /// blank or malformed, the quantity is zero, or the seat list is empty
    /// or repeats a seat.
    pub fn validate(&self, request: &BookingRequest) -> Result<(), InventoryError> {
        validate_customer(&request.customer)?;
        match &request.allocation {
            Allocation::Tickets { quantity } => {
                if *quantity == 0 {
                    return Err(InventoryError::InvalidRequest(
                        "quantity must be at least 1".to_string(),
                    ));
                }
            }
            Allocation::Seats { seat_numbers } => {
                if seat_numbers.is_empty() {
                    return Err(InventoryError::InvalidRequest(
                        "at least one seat must be selected".to_string(),
                    ));
                }
                let mut sorted = seat_numbers.clone();
                sorted.sort_unstable();
                if let Some(pair) = sorted.windows(2).find(|w| w.first() == w.get(1)) {
                    let seat = pair.first().copied().unwrap_or_default();
                    return Err(InventoryError::InvalidRequest(format!(
                        "seat {seat} requested more than once"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Decides a request against a pool's current state.
    ///
    /// Pure: nothing is written. The returned plan carries the next state
    /// and the ledger record to commit together.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::InvalidRequest`] for malformed requests, a request
    ///   aimed at another pool, a kind mismatch, or unknown seats.
    /// - [`InventoryError::InsufficientCapacity`] when a capacity pool has
    ///   fewer tickets left than requested.
    /// - [`InventoryError::SeatUnavailable`] when a requested seat is already
    ///   booked.
    pub fn plan(
        &self,
        pool: &Pool,
        state: &PoolState,
        request: &BookingRequest,
    ) -> Result<AllocationPlan, InventoryError> {
        self.validate(request)?;
        if request.pool_id != pool.id {
            return Err(InventoryError::InvalidRequest(format!(
                "request targets pool {} but was routed to pool {}",
                request.pool_id, pool.id
            )));
        }
        if request.allocation.kind() != pool.kind {
            let expected = match pool.kind {
                PoolKind::Capacity => "a ticket quantity",
                PoolKind::Slotted => "a list of seat numbers",
            };
            return Err(InventoryError::InvalidRequest(format!(
                "{} pools are booked with {expected}",
                pool.kind.as_str()
            )));
        }

        let next_state = state.apply(&request.allocation)?;
        let record = BookingRecord {
            booking_id: BookingId::new(),
            pool_id: pool.id,
            customer: normalize_customer(&request.customer),
            allocation: request.allocation.clone(),
            remaining_after: next_state.remaining(),
            booked_at: Utc::now(),
        };
        Ok(AllocationPlan { next_state, record })
    }

    /// Decides a request under `permit` and commits it through `store`.
    ///
    /// Exactly one ledger record is appended on success; on any error the
    /// pool state and ledger are untouched. `on_commit` runs once the
    /// booking is durable and visible, before the permit is released.
    ///
    /// # Errors
    ///
    /// Any rejection from [`AllocationEngine::plan`], or
    /// [`InventoryError::StorageFailure`] from the commit.
    pub async fn allocate<F>(
        &self,
        store: &InventoryStore,
        permit: CommitPermit,
        request: &BookingRequest,
        on_commit: F,
    ) -> Result<Allocated, InventoryError>
    where
        F: FnOnce(&BookingRecord) + Send + 'static,
    {
        let state = permit.state().await;
        let plan = self.plan(permit.pool(), &state, request)?;
        let remaining = plan.remaining();
        let record = store
            .commit(permit, plan.next_state, plan.record, on_commit)
            .await?;
        Ok(Allocated { record, remaining })
    }
}

fn validate_customer(customer: &Customer) -> Result<(), InventoryError> {
    validate_name("first_name", &customer.first_name)?;
    validate_name("last_name", &customer.last_name)?;
    if !is_plausible_email(customer.email.trim()) {
        return Err(InventoryError::InvalidRequest(format!(
            "email is not a valid address: {:?}",
            customer.email
        )));
    }
    Ok(())
}

fn validate_name(field: &str, value: &str) -> Result<(), InventoryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InventoryError::InvalidRequest(format!(
            "{field} must not be empty"
        )));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(InventoryError::InvalidRequest(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Syntactic check only: one `@`, a non-empty local part, and a dotted
/// domain with no leading or trailing dot.
fn is_plausible_email(email: &str) -> bool {
    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn normalize_customer(customer: &Customer) -> Customer {
    Customer {
        first_name: customer.first_name.trim().to_string(),
        last_name: customer.last_name.trim().to_string(),
        email: customer.email.trim().to_string(),
    }
}

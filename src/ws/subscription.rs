//! Per-connection subscription manager.
//!
//! Tracks which pools and event types a WebSocket client is subscribed to
//! and provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::{InventoryEvent, PoolId};

/// Manages the subscriptions of a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed pool IDs. If `subscribe_all` is true, this set is ignored.
    pool_ids: HashSet<PoolId>,
    /// Whether the client subscribes to all pools (wildcard `"*"`).
    subscribe_all: bool,
    /// Accepted event types; empty means every type.
    event_types: HashSet<String>,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds pool IDs to the subscription set. `wildcard` subscribes to all
    /// pools, including ones created later.
    pub fn subscribe(&mut self, ids: &[PoolId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.pool_ids.extend(ids.iter().copied());
    }

    /// Replaces the event type filter. An empty list accepts every type.
    pub fn set_event_types(&mut self, types: &[String]) {
        self.event_types = types.iter().cloned().collect();
    }

    /// Removes pool IDs from the subscription set.
    pub fn unsubscribe(&mut self, ids: &[PoolId]) {
        for id in ids {
            self.pool_ids.remove(id);
        }
    }

    /// Returns `true` if the event should be delivered to this client.
    #[must_use]
    pub fn matches(&self, event: &InventoryEvent) -> bool {
        let pool_ok = self.subscribe_all || self.pool_ids.contains(&event.pool_id());
        let type_ok =
            self.event_types.is_empty() || self.event_types.contains(event.event_type_str());
        pool_ok && type_ok
    }

    /// Returns the number of explicitly subscribed pool IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pool_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

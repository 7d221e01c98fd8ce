//! Domain layer: identifiers, pools, bookings, and the event system.
//!
//! Pools come in two kinds sharing one allocation protocol: capacity pools
//! (conference tickets) and slotted pools (bus seats). See
//! [`PoolKind`] and [`PoolState`].

pub mod booking;
pub mod event_bus;
pub mod ids;
pub mod inventory_event;
pub mod pool;

pub use booking::{Allocation, BookingRecord, BookingRequest, Customer};
pub use event_bus::EventBus;
pub use ids::{BookingId, PoolId};
pub use inventory_event::InventoryEvent;
pub use pool::{Pool, PoolKind, PoolMetadata, PoolState, PoolSummary, Seat, SeatStatus};

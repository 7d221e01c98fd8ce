//! Inventory allocation core.
//!
//! ```text
//! BookingCoordinator   per-pool FIFO permit
//!     │
//!     ├── AllocationEngine   validate + decide (pure)
//!     │
//!     └── InventoryStore     durable commit, then state swap
//!             └── BookingLedger (per pool, append-only)
//! ```

pub mod coordinator;
pub mod engine;
pub mod ledger;
pub mod store;

pub use coordinator::BookingCoordinator;
pub use engine::{Allocated, AllocationEngine, AllocationPlan};
pub use ledger::BookingLedger;
pub use store::{CommitPermit, InventoryStore, PoolSlot};

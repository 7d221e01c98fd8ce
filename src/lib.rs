//! # seatbook
//!
//! Inventory allocation service for bus seats and conference tickets.
//!
//! Conferences are *capacity pools* (a count of fungible tickets); buses are
//! *slotted pools* (individually numbered seats). Both share one booking
//! protocol that never oversells a pool and never grants a seat twice, no
//! matter how many requests arrive at once.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── BookingService (service/) ──► EventBus (domain/) ──► ticket dispatcher (notify/)
//!     │
//!     ├── BookingCoordinator ─ AllocationEngine (inventory/)
//!     ├── InventoryStore + BookingLedger (inventory/)
//!     │
//!     └── PersistenceBackend: memory | PostgreSQL (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod inventory;
pub mod notify;
pub mod persistence;
pub mod service;
pub mod ws;

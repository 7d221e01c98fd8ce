//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` pushes committed inventory events to
//! dashboards and answers read-only pool queries.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;

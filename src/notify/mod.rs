//! Background notifications driven by the event bus.

pub mod ticket_dispatch;

pub use ticket_dispatch::{TicketNotice, spawn as spawn_ticket_dispatcher, ticket_notice};

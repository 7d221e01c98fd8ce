//! Data Transfer Objects for REST request/response serialization.
//!
//! DTOs are kept apart from the domain types so the wire shape can evolve
//! without touching the inventory core.

pub mod booking_dto;
pub mod common_dto;
pub mod pool_dto;

pub use booking_dto::*;
pub use common_dto::*;
pub use pool_dto::*;

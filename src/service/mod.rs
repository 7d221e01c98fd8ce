//! Service layer: business logic orchestration.
//!
//! [`BookingService`] exposes pool creation, booking, and the read paths
//! used by dashboards, and emits events through the
//! [`super::domain::EventBus`].

pub mod booking_service;

pub use booking_service::{
    BookingService, DEFAULT_RECENT_LIMIT, DashboardSummary, KindTotals, PoolDetails,
    ServiceLimits,
};

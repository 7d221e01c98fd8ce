//! Ticket dispatcher: delivers a confirmation for every committed booking.
//!
//! Delivery is best-effort and runs off the booking path. The dispatcher
//! only sees bookings through the [`EventBus`], i.e. after they are
//! durable, and nothing it does can affect a commit.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::domain::{Allocation, BookingId, EventBus, InventoryEvent, PoolId};

/// A confirmation ready to be sent to a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketNotice {
    /// Booking being confirmed.
    pub booking_id: BookingId,
    /// Pool the booking belongs to.
    pub pool_id: PoolId,
    /// Recipient address.
    pub email: String,
    /// Human-readable ticket line.
    pub summary: String,
}

/// Builds the notice for a confirmed booking; other events yield `None`.
#[must_use]
pub fn ticket_notice(event: &InventoryEvent) -> Option<TicketNotice> {
    let InventoryEvent::BookingConfirmed {
        pool_id,
        booking_id,
        customer,
        allocation,
        ..
    } = event
    else {
        return None;
    };
    let holder = format!("{} {}", customer.first_name, customer.last_name);
    let summary = match allocation {
        Allocation::Tickets { quantity: 1 } => format!("1 ticket for {holder}"),
        Allocation::Tickets { quantity } => format!("{quantity} tickets for {holder}"),
        Allocation::Seats { seat_numbers } => {
            let seats: Vec<String> = seat_numbers.iter().map(ToString::to_string).collect();
            let noun = if seats.len() == 1 { "seat" } else { "seats" };
            format!("{noun} {} for {holder}", seats.join(", "))
        }
    };
    Some(TicketNotice {
        booking_id: *booking_id,
        pool_id: *pool_id,
        email: customer.email.clone(),
        summary,
    })
}

/// Spawns the dispatcher on the current runtime.
///
/// The task runs until the bus is closed, i.e. until every
/// [`EventBus`] clone has been dropped.
#[must_use]
pub fn spawn(bus: &EventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(notice) = ticket_notice(&event) {
                        deliver(&notice);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "ticket dispatcher lagged; confirmations skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("ticket dispatcher stopped");
    })
}

fn deliver(notice: &TicketNotice) {
    tracing::info!(
        booking_id = %notice.booking_id,
        pool_id = %notice.pool_id,
        email = %notice.email,
        ticket = %notice.summary,
        "ticket sent"
    );
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::Customer;

    fn confirmed(allocation: Allocation) -> InventoryEvent {
        InventoryEvent::BookingConfirmed {
            pool_id: PoolId::new(),
            booking_id: BookingId::new(),
            customer: Customer::new("Ada", "Lovelace", "ada@example.com"),
            allocation,
            remaining: 3,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn notice_describes_tickets_and_seats() {
        let Some(notice) = ticket_notice(&confirmed(Allocation::Tickets { quantity: 2 })) else {
            panic!("expected a notice");
        };
        assert_eq!(notice.summary, "2 tickets for Ada Lovelace");
        assert_eq!(notice.email, "ada@example.com");

        let Some(notice) = ticket_notice(&confirmed(Allocation::Seats {
            seat_numbers: vec![4, 5],
        })) else {
            panic!("expected a notice");
        };
        assert_eq!(notice.summary, "seats 4, 5 for Ada Lovelace");
    }

    #[test]
    fn other_events_are_ignored() {
        let event = InventoryEvent::PoolSoldOut {
            pool_id: PoolId::new(),
            timestamp: Utc::now(),
        };
        assert_eq!(ticket_notice(&event), None);
    }

    #[tokio::test]
    async fn dispatcher_stops_when_bus_closes() {
        let bus = EventBus::new(4);
        let handle = spawn(&bus);
        let _ = bus.publish(confirmed(Allocation::Tickets { quantity: 1 }));
        drop(bus);
        let joined = tokio::time::timeout(std::time::Duration::from_secs(5), handle).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }
}

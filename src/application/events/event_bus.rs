//! Broadcast bus for engine events
//!
//! Every mutation publishes after its in-memory commit. Subscribers either
//! see the whole stream or follow a single booking.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::types::{Event, EventMessage};
use crate::domain::BookingId;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventMessage>,
}

impl EventBus {
    /// Bus retaining up to `capacity` undelivered messages per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish `event`, returning how many subscribers it reached.
    pub fn publish(&self, event: Event) -> usize {
        let message = EventMessage::new(event);
        let event_type = message.event.event_type();
        let booking_id = message.event.booking_id();
        let vehicle_id = message.event.vehicle_id();

        let reached = self.sender.send(message).unwrap_or(0);
        debug!(event_type, ?booking_id, ?vehicle_id, reached, "Event published");
        reached
    }

    /// Every event published from now on.
    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber {
            receiver: self.sender.subscribe(),
            booking_id: None,
        }
    }

    /// Only the events about `booking_id`: its creation, status changes and
    /// reviews.
    pub fn subscribe_booking(&self, booking_id: BookingId) -> EventSubscriber {
        EventSubscriber {
            receiver: self.sender.subscribe(),
            booking_id: Some(booking_id),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

pub struct EventSubscriber {
    receiver: broadcast::Receiver<EventMessage>,
    booking_id: Option<BookingId>,
}

impl EventSubscriber {
    fn wants(&self, message: &EventMessage) -> bool {
        self.booking_id
            .map_or(true, |id| message.event.booking_id() == Some(id))
    }

    /// Next matching message. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(msg) if self.wants(&msg) => return Some(msg),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, booking_id = ?self.booking_id, "Event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching message already published, without waiting.
    pub fn try_recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.receiver.try_recv() {
                Ok(msg) if self.wants(&msg) => return Some(msg),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!(missed, booking_id = ?self.booking_id, "Event subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

pub type SharedEventBus = Arc<EventBus>;

pub fn create_event_bus(capacity: usize) -> SharedEventBus {
    Arc::new(EventBus::new(capacity))
}

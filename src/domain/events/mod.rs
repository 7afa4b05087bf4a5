//! Domain events
//!
//! Event types that represent facts about what happened in the engine.
//! The EventBus implementation lives in `application::events`.

pub mod types;

// Re-export all event types
pub use types::{
    BookingRequestedEvent, BookingStatusChangedEvent, Event, EventMessage, ReviewAddedEvent,
    UserVerificationChangedEvent,
};

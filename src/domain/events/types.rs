//! Engine events
//!
//! Facts published after a mutation has been committed in memory.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{BookingId, BookingStatus, ReviewId, UserId, UserRole, VehicleId};

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A client submitted a booking
    BookingRequested(BookingRequestedEvent),
    /// A booking moved along its state machine
    BookingStatusChanged(BookingStatusChangedEvent),
    /// A party of a completed booking left a review
    ReviewAdded(ReviewAddedEvent),
    /// An admin recorded a verification outcome for an account
    UserVerificationChanged(UserVerificationChangedEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::BookingRequested(_) => "booking_requested",
            Event::BookingStatusChanged(_) => "booking_status_changed",
            Event::ReviewAdded(_) => "review_added",
            Event::UserVerificationChanged(_) => "user_verification_changed",
        }
    }

    /// Get the booking ID if applicable
    pub fn booking_id(&self) -> Option<BookingId> {
        match self {
            Event::BookingRequested(e) => Some(e.booking_id),
            Event::BookingStatusChanged(e) => Some(e.booking_id),
            Event::ReviewAdded(e) => Some(e.booking_id),
            Event::UserVerificationChanged(_) => None,
        }
    }

    pub fn vehicle_id(&self) -> Option<VehicleId> {
        match self {
            Event::BookingRequested(e) => Some(e.vehicle_id),
            Event::BookingStatusChanged(e) => Some(e.vehicle_id),
            Event::ReviewAdded(_) | Event::UserVerificationChanged(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequestedEvent {
    pub booking_id: BookingId,
    pub vehicle_id: VehicleId,
    pub owner_id: UserId,
    pub client_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_price: Decimal,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusChangedEvent {
    pub booking_id: BookingId,
    pub vehicle_id: VehicleId,
    pub old_status: BookingStatus,
    pub new_status: BookingStatus,
    pub acting_user_id: UserId,
    pub acting_role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAddedEvent {
    pub review_id: ReviewId,
    pub booking_id: BookingId,
    pub reviewer_id: UserId,
    pub reviewee_id: UserId,
    pub rating: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVerificationChangedEvent {
    pub user_id: UserId,
    pub is_verified: bool,
}

/// Envelope carried by the bus. Outbound only.
#[derive(Debug, Clone, Serialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

//! Booking entity and its status state machine

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{DateRange, UserId, UserRole, VehicleId};

pub type BookingId = u64;

/// Booking status
///
/// ```text
///            ┌──> confirmed ──> completed
/// pending ───┤        │
///            ├──> rejected
///            └──────────┴──> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Waiting for the owner's decision
    Pending,
    /// Accepted; the vehicle is reserved
    Confirmed,
    /// Rental period finished
    Completed,
    /// Withdrawn by the client or an admin
    Cancelled,
    /// Declined by the owner or an admin
    Rejected,
}

/// Who may drive a transition, relative to a specific booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionParty {
    /// The lessor owning the booked vehicle
    Owner,
    /// The client who made the booking
    Client,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Completed,
        Self::Cancelled,
        Self::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
        }
    }

    /// Pending and confirmed bookings hold their dates.
    pub fn blocks_dates(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Rejected)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        self.party_for(next).is_some()
    }

    /// Non-admin party allowed to move a booking from `self` to `next`,
    /// or `None` when the edge does not exist. Admins may drive every edge.
    pub fn party_for(&self, next: BookingStatus) -> Option<TransitionParty> {
        use BookingStatus::*;

        match (self, next) {
            (Pending, Confirmed) | (Pending, Rejected) | (Confirmed, Completed) => {
                Some(TransitionParty::Owner)
            }
            (Pending, Cancelled) | (Confirmed, Cancelled) => Some(TransitionParty::Client),
            _ => None,
        }
    }

    /// Role a non-admin actor needs for the given party.
    pub fn role_for(party: TransitionParty) -> UserRole {
        match party {
            TransitionParty::Owner => UserRole::Lessor,
            TransitionParty::Client => UserRole::Client,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown booking status '{}'", s))
    }
}

/// Reservation of one vehicle by one client over an inclusive date span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub vehicle_id: VehicleId,
    /// Denormalized from the vehicle at creation time
    pub owner_id: UserId,
    pub client_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_price: Decimal,
    pub status: BookingStatus,
}

impl Booking {
    /// Inclusive span of the booking. Bookings are only created from a
    /// validated range and inverted stored records are refused at load, so
    /// the start-day fallback is unreachable in a running marketplace.
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
            .unwrap_or_else(|_| DateRange::single(self.start_date))
    }

    pub fn blocks_dates(&self) -> bool {
        self.status.blocks_dates()
    }

    /// Whether `user_id` plays `party` on this booking.
    pub fn is_party(&self, party: TransitionParty, user_id: &str) -> bool {
        match party {
            TransitionParty::Owner => self.owner_id == user_id,
            TransitionParty::Client => self.client_id == user_id,
        }
    }
}

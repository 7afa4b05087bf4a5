//! Post-rental review entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BookingId, DomainResult, UserId, VehicleId};
use crate::shared::errors::DomainError;

pub type ReviewId = u64;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Star rating between 1 and 5 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> DomainResult<Self> {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(DomainError::Validation(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Immutable rating left by one party of a completed booking about the other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub booking_id: BookingId,
    pub vehicle_id: VehicleId,
    pub reviewer_id: UserId,
    /// Client or owner, whichever party the reviewer is not
    pub reviewee_id: UserId,
    pub rating: Rating,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate of received ratings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub count: usize,
    /// Mean rating, `0.0` when nothing has been rated yet
    pub average: f64,
}

impl RatingSummary {
    pub fn from_reviews<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> Self {
        let (count, sum) = reviews
            .into_iter()
            .fold((0usize, 0u64), |(count, sum), r| {
                (count + 1, sum + u64::from(r.rating.value()))
            });
        let average = if count == 0 {
            0.0
        } else {
            sum as f64 / count as f64
        };
        Self { count, average }
    }
}

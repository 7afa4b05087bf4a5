use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{BookingId, BookingStatus, Collection, DateRange, VehicleId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error(
        "Vehicle {vehicle_id} is not available: booked {conflicting} ({} day(s) overlap)",
        .dates.len()
    )]
    DateConflict {
        vehicle_id: VehicleId,
        /// Range of the existing booking that blocks the request
        conflicting: DateRange,
        /// Requested dates that are unavailable
        dates: Vec<NaiveDate>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Booking {0} is not completed")]
    NotCompleted(BookingId),

    #[error("User {reviewer_id} already reviewed booking {booking_id}")]
    DuplicateReview {
        booking_id: BookingId,
        reviewer_id: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),
}

/// Coarse classification used by callers to decide how to surface an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied bad input; re-submitting the same request fails again
    Validation,
    /// Request collides with existing state (dates taken, duplicate record)
    Conflict,
    /// Actor may not perform the operation in the current state
    Authorization,
    NotFound,
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDateRange { .. } | Self::Validation(_) => ErrorKind::Validation,
            Self::DateConflict { .. } | Self::DuplicateReview { .. } | Self::Conflict(_) => {
                ErrorKind::Conflict
            }
            Self::Unauthorized(_) | Self::InvalidTransition { .. } | Self::NotCompleted(_) => {
                ErrorKind::Authorization
            }
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt {collection} record: {reason}")]
    Corrupt {
        collection: Collection,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn date_conflict_message_names_range_and_overlap() {
        let err = DomainError::DateConflict {
            vehicle_id: 7,
            conflicting: DateRange::new(date("2024-07-10"), date("2024-07-12")).unwrap(),
            dates: vec![date("2024-07-11"), date("2024-07-12")],
        };
        let msg = err.to_string();
        assert!(msg.contains("Vehicle 7"));
        assert!(msg.contains("2024-07-10..=2024-07-12"));
        assert!(msg.contains("2 day(s)"));
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            DomainError::Validation("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            DomainError::InvalidTransition {
                from: BookingStatus::Completed,
                to: BookingStatus::Cancelled,
            }
            .kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            DomainError::not_found("Booking", "id", 3).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DomainError::DuplicateReview {
                booking_id: 1,
                reviewer_id: "ana".into()
            }
            .kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn not_found_formats_entity_and_value() {
        let err = DomainError::not_found("Vehicle", "id", 42);
        assert_eq!(err.to_string(), "Not found: Vehicle with id=42");
    }
}

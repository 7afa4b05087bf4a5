//! Core business entities, value types and the persistence port

pub mod booking;
pub mod date_range;
pub mod events;
pub mod repositories;
pub mod review;
pub mod user;
pub mod vehicle;

// Re-export commonly used types
pub use booking::{Booking, BookingId, BookingStatus, TransitionParty};
pub use date_range::{parse_iso_date, DateRange, ISO_DATE_FORMAT};
pub use repositories::{Collection, CollectionStore, DomainResult, Record, Storage};
pub use review::{Rating, RatingSummary, Review, ReviewId};
pub use user::{normalize_user_id, Actor, RegisterClientDto, User, UserId, UserRole};
pub use vehicle::{
    Fuel, NewVehicleDto, Transmission, Vehicle, VehicleFilter, VehicleId, VehicleSpecs,
    VehicleUpdateDto,
};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;

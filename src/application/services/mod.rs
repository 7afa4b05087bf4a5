//! Application services

pub mod catalog;
mod reservation;
mod reviews;

pub use catalog::{is_discoverable, CatalogService};
pub use reservation::{authorize_transition, BookingPolicy, ReservationService};
pub use reviews::ReviewService;

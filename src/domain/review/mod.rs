//! Review aggregate

pub mod model;

pub use model::{Rating, RatingSummary, Review, ReviewId, MAX_RATING, MIN_RATING};

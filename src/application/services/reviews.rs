//! Review ledger
//!
//! Each party of a completed booking may review the other exactly once.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::application::events::{Event, ReviewAddedEvent, SharedEventBus};
use crate::application::state::{next_id, MarketplaceState};
use crate::domain::{
    normalize_user_id, BookingId, BookingStatus, DomainError, DomainResult, Rating, RatingSummary,
    Review, TransitionParty, VehicleId,
};

pub struct ReviewService {
    state: Arc<MarketplaceState>,
    events: SharedEventBus,
}

impl ReviewService {
    pub fn new(state: Arc<MarketplaceState>, events: SharedEventBus) -> Self {
        Self { state, events }
    }

    pub async fn add_review(
        &self,
        booking_id: BookingId,
        reviewer_id: &str,
        rating: u8,
        comment: &str,
    ) -> DomainResult<Review> {
        let rating = Rating::new(rating)?;
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(DomainError::Validation("review comment is required".into()));
        }
        let reviewer_id = normalize_user_id(reviewer_id);

        let booking = {
            let bookings = self.state.bookings.read().await;
            bookings
                .iter()
                .find(|b| b.id == booking_id)
                .cloned()
                .ok_or_else(|| DomainError::not_found("Booking", "id", booking_id))?
        };

        // Completed is terminal, so the status cannot move after this check.
        if booking.status != BookingStatus::Completed {
            return Err(DomainError::NotCompleted(booking_id));
        }

        let reviewee_id = if booking.is_party(TransitionParty::Client, &reviewer_id) {
            booking.owner_id.clone()
        } else if booking.is_party(TransitionParty::Owner, &reviewer_id) {
            booking.client_id.clone()
        } else {
            return Err(DomainError::Unauthorized(format!(
                "{} took no part in booking {}",
                reviewer_id, booking_id
            )));
        };

        let mut reviews = self.state.reviews.write().await;
        if reviews
            .iter()
            .any(|r| r.booking_id == booking_id && r.reviewer_id == reviewer_id)
        {
            return Err(DomainError::DuplicateReview {
                booking_id,
                reviewer_id,
            });
        }

        let review = Review {
            id: next_id(reviews.as_slice(), |r| r.id),
            booking_id,
            vehicle_id: booking.vehicle_id,
            reviewer_id,
            reviewee_id,
            rating,
            comment: comment.to_string(),
            timestamp: Utc::now(),
        };
        reviews.push(review.clone());
        self.state.persist(reviews.as_slice()).await;
        drop(reviews);

        info!(
            review_id = review.id,
            booking_id,
            reviewer = %review.reviewer_id,
            reviewee = %review.reviewee_id,
            rating = rating.value(),
            "Review added"
        );

        self.events.publish(Event::ReviewAdded(ReviewAddedEvent {
            review_id: review.id,
            booking_id,
            reviewer_id: review.reviewer_id.clone(),
            reviewee_id: review.reviewee_id.clone(),
            rating: rating.value(),
        }));

        Ok(review)
    }

    pub async fn reviews_for_booking(&self, booking_id: BookingId) -> Vec<Review> {
        self.state
            .reviews
            .read()
            .await
            .iter()
            .filter(|r| r.booking_id == booking_id)
            .cloned()
            .collect()
    }

    /// Reviews the vehicle's owner received on bookings of that vehicle,
    /// newest first.
    pub async fn reviews_for_vehicle(&self, vehicle_id: VehicleId) -> DomainResult<Vec<Review>> {
        let owner_id = {
            let vehicles = self.state.vehicles.read().await;
            vehicles
                .iter()
                .find(|v| v.id == vehicle_id)
                .map(|v| v.owner_id.clone())
                .ok_or_else(|| DomainError::not_found("Vehicle", "id", vehicle_id))?
        };

        let mut found: Vec<Review> = self
            .state
            .reviews
            .read()
            .await
            .iter()
            .filter(|r| r.vehicle_id == vehicle_id && r.reviewee_id == owner_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    pub async fn rating_summary_for_vehicle(&self, vehicle_id: VehicleId) -> DomainResult<RatingSummary> {
        let reviews = self.reviews_for_vehicle(vehicle_id).await?;
        Ok(RatingSummary::from_reviews(&reviews))
    }

    /// Ratings received by `user_id` in either role.
    pub async fn rating_summary_for_user(&self, user_id: &str) -> RatingSummary {
        let user_id = normalize_user_id(user_id);
        let reviews = self.state.reviews.read().await;
        RatingSummary::from_reviews(reviews.iter().filter(|r| r.reviewee_id == user_id))
    }
}

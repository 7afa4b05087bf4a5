//! Reservation lifecycle
//!
//! Creation runs the overlap check and the append under a per-vehicle
//! mutex, so two concurrent requests for the same vehicle cannot both
//! pass the check.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::application::availability;
use crate::application::events::{
    BookingRequestedEvent, BookingStatusChangedEvent, Event, SharedEventBus,
};
use crate::application::pricing;
use crate::application::services::catalog::is_discoverable;
use crate::application::state::{next_id, MarketplaceState};
use crate::config::BookingConfig;
use crate::domain::{
    normalize_user_id, Actor, Booking, BookingId, BookingStatus, DateRange, DomainError,
    DomainResult, UserId, UserRole, VehicleId,
};

/// Status given to new bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// Payment is captured outside the engine; when set, submission counts
    /// as confirmation.
    pub auto_confirm: bool,
}

impl BookingPolicy {
    pub fn initial_status(&self) -> BookingStatus {
        if self.auto_confirm {
            BookingStatus::Confirmed
        } else {
            BookingStatus::Pending
        }
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self { auto_confirm: true }
    }
}

impl From<&BookingConfig> for BookingPolicy {
    fn from(config: &BookingConfig) -> Self {
        Self {
            auto_confirm: config.auto_confirm,
        }
    }
}

/// Check that `actor` may move `booking` to `next`.
///
/// Edge existence is checked before the actor, so any request out of a
/// terminal status reports `InvalidTransition`.
pub fn authorize_transition(
    booking: &Booking,
    next: BookingStatus,
    actor: &Actor,
) -> DomainResult<()> {
    let party = booking
        .status
        .party_for(next)
        .ok_or(DomainError::InvalidTransition {
            from: booking.status,
            to: next,
        })?;

    if actor.is_admin() {
        return Ok(());
    }
    if actor.role == BookingStatus::role_for(party) && booking.is_party(party, &actor.user_id) {
        return Ok(());
    }
    Err(DomainError::Unauthorized(format!(
        "{} ({}) may not move booking {} from {} to {}",
        actor.user_id, actor.role, booking.id, booking.status, next
    )))
}

pub struct ReservationService {
    state: Arc<MarketplaceState>,
    events: SharedEventBus,
    policy: BookingPolicy,
    vehicle_locks: DashMap<VehicleId, Arc<Mutex<()>>>,
}

impl ReservationService {
    pub fn new(state: Arc<MarketplaceState>, events: SharedEventBus, policy: BookingPolicy) -> Self {
        Self {
            state,
            events,
            policy,
            vehicle_locks: DashMap::new(),
        }
    }

    pub fn policy(&self) -> BookingPolicy {
        self.policy
    }

    fn vehicle_lock(&self, vehicle_id: VehicleId) -> Arc<Mutex<()>> {
        self.vehicle_locks
            .entry(vehicle_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Unavailable dates of a vehicle, recomputed from the bookings.
    pub async fn blocked_dates(&self, vehicle_id: VehicleId) -> BTreeSet<NaiveDate> {
        let bookings = self.state.bookings.read().await;
        availability::blocked_dates(bookings.iter(), vehicle_id)
    }

    // ── Creation ────────────────────────────────────────────────

    pub async fn request_booking(
        &self,
        vehicle_id: VehicleId,
        client_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> DomainResult<Booking> {
        let range = DateRange::new(start_date, end_date)?;
        let client_id = normalize_user_id(client_id);

        let users = self.state.users.read().await;
        let client = users
            .iter()
            .find(|u| u.id == client_id)
            .ok_or_else(|| DomainError::Unauthorized(format!("unknown client {}", client_id)))?;
        if client.role != UserRole::Client {
            return Err(DomainError::Unauthorized(format!(
                "{} is a {}, only clients can book",
                client_id, client.role
            )));
        }
        let client_actor = client.actor();

        // Held until the booking is appended, so the vehicle and its price
        // cannot change underneath the request.
        let vehicles = self.state.vehicles.read().await;
        let vehicle = vehicles
            .iter()
            .find(|v| v.id == vehicle_id)
            .filter(|v| {
                let owner = users.iter().find(|u| u.id == v.owner_id);
                is_discoverable(v, owner, Some(&client_actor))
            })
            .ok_or_else(|| DomainError::not_found("Vehicle", "id", vehicle_id))?;
        drop(users);

        let total_price = pricing::price(&range, vehicle.daily_price)?;

        let lock = self.vehicle_lock(vehicle_id);
        let _guard = lock.lock().await;

        // Re-check at commit time; the caller's calendar may be stale.
        {
            let bookings = self.state.bookings.read().await;
            if let Err(e) = availability::ensure_available(bookings.iter(), vehicle_id, &range) {
                warn!(vehicle_id, client_id = %client_id, %range, "Booking request conflicts");
                return Err(e);
            }
        }

        let mut bookings = self.state.bookings.write().await;
        let booking = Booking {
            id: next_id(bookings.as_slice(), |b| b.id),
            vehicle_id,
            owner_id: vehicle.owner_id.clone(),
            client_id,
            start_date,
            end_date,
            total_price,
            status: self.policy.initial_status(),
        };
        bookings.push(booking.clone());
        self.state.persist(bookings.as_slice()).await;
        drop(bookings);
        drop(vehicles);

        info!(
            booking_id = booking.id,
            vehicle_id,
            client_id = %booking.client_id,
            days = range.number_of_days(),
            total_price = %booking.total_price,
            status = %booking.status,
            "Booking created"
        );

        self.events.publish(Event::BookingRequested(BookingRequestedEvent {
            booking_id: booking.id,
            vehicle_id: booking.vehicle_id,
            owner_id: booking.owner_id.clone(),
            client_id: booking.client_id.clone(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            total_price: booking.total_price,
            status: booking.status,
        }));

        Ok(booking)
    }

    // ── Transitions ─────────────────────────────────────────────

    pub async fn update_status(
        &self,
        booking_id: BookingId,
        new_status: BookingStatus,
        actor: &Actor,
    ) -> DomainResult<Booking> {
        let mut bookings = self.state.bookings.write().await;
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| DomainError::not_found("Booking", "id", booking_id))?;

        if let Err(e) = authorize_transition(booking, new_status, actor) {
            warn!(
                booking_id,
                from = %booking.status,
                to = %new_status,
                actor = %actor.user_id,
                error = %e,
                "Status change refused"
            );
            return Err(e);
        }

        let old_status = booking.status;
        booking.status = new_status;
        let updated = booking.clone();
        self.state.persist(bookings.as_slice()).await;
        drop(bookings);

        info!(
            booking_id,
            from = %old_status,
            to = %new_status,
            actor = %actor.user_id,
            role = %actor.role,
            "Booking status changed"
        );

        self.events
            .publish(Event::BookingStatusChanged(BookingStatusChangedEvent {
                booking_id,
                vehicle_id: updated.vehicle_id,
                old_status,
                new_status,
                acting_user_id: actor.user_id.clone(),
                acting_role: actor.role,
            }));

        Ok(updated)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn find_booking(&self, booking_id: BookingId) -> DomainResult<Booking> {
        self.state
            .bookings
            .read()
            .await
            .iter()
            .find(|b| b.id == booking_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Booking", "id", booking_id))
    }

    /// Bookings made by `client_id`, newest first.
    pub async fn bookings_for_client(&self, client_id: &str) -> Vec<Booking> {
        let client_id = normalize_user_id(client_id);
        self.newest_first(|b| b.client_id == client_id).await
    }

    /// Bookings of vehicles owned by `owner_id`, newest first.
    pub async fn bookings_for_owner(&self, owner_id: &str) -> Vec<Booking> {
        let owner_id: UserId = normalize_user_id(owner_id);
        self.newest_first(|b| b.owner_id == owner_id).await
    }

    async fn newest_first(&self, keep: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        let mut found: Vec<Booking> = self
            .state
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| keep(*b))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.id.cmp(&a.id));
        found
    }
}

//! Engine facade
//!
//! Wires storage, in-memory state, the event bus and the services
//! together, and exposes the engine's operations as plain async methods.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::application::events::{create_event_bus, EventSubscriber, SharedEventBus};
use crate::application::selector::DateRangeSelector;
use crate::application::services::{BookingPolicy, CatalogService, ReservationService, ReviewService};
use crate::application::state::MarketplaceState;
use crate::config::{AppConfig, StorageBackend};
use crate::domain::{
    Actor, Booking, BookingId, BookingStatus, CollectionStore, DomainResult, NewVehicleDto,
    RatingSummary, RegisterClientDto, Review, Storage, User, Vehicle, VehicleFilter, VehicleId,
    VehicleUpdateDto,
};
use crate::infrastructure::storage::{InMemoryStorage, JsonFileStorage};
use crate::shared::errors::{AppError, InfraError};

pub struct Marketplace {
    events: SharedEventBus,
    reservations: ReservationService,
    reviews: ReviewService,
    catalog: CatalogService,
}

impl Marketplace {
    /// Open the backend named by `config.storage` and load its collections.
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn Storage> = match config.storage.backend {
            StorageBackend::Json => {
                let storage = JsonFileStorage::open(&config.storage.data_dir).await?;
                info!(data_dir = %storage.data_dir().display(), "Using JSON file storage");
                Arc::new(storage)
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                Arc::new(InMemoryStorage::new())
            }
        };
        Ok(Self::with_storage(config, storage).await?)
    }

    /// Build on an already constructed backend.
    pub async fn with_storage(config: &AppConfig, storage: Arc<dyn Storage>) -> Result<Self, InfraError> {
        let state = Arc::new(MarketplaceState::load(CollectionStore::new(storage)).await?);
        let events = create_event_bus(config.events.capacity);
        let policy = BookingPolicy::from(&config.booking);

        info!(auto_confirm = policy.auto_confirm, "Marketplace ready");

        Ok(Self {
            reservations: ReservationService::new(state.clone(), events.clone(), policy),
            reviews: ReviewService::new(state.clone(), events.clone()),
            catalog: CatalogService::new(state, events.clone()),
            events,
        })
    }

    pub fn subscribe(&self) -> EventSubscriber {
        self.events.subscribe()
    }

    /// Events about one booking only.
    pub fn subscribe_booking(&self, booking_id: BookingId) -> EventSubscriber {
        self.events.subscribe_booking(booking_id)
    }

    pub fn policy(&self) -> BookingPolicy {
        self.reservations.policy()
    }

    // ── Reservations ────────────────────────────────────────────

    pub async fn blocked_dates(&self, vehicle_id: VehicleId) -> BTreeSet<NaiveDate> {
        self.reservations.blocked_dates(vehicle_id).await
    }

    /// Calendar selector seeded with the vehicle's current blocked dates.
    pub async fn selector(&self, vehicle_id: VehicleId, today: NaiveDate) -> DateRangeSelector {
        DateRangeSelector::new(self.blocked_dates(vehicle_id).await, today)
    }

    pub async fn request_booking(
        &self,
        vehicle_id: VehicleId,
        client_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> DomainResult<Booking> {
        self.reservations
            .request_booking(vehicle_id, client_id, start_date, end_date)
            .await
    }

    pub async fn update_status(
        &self,
        booking_id: BookingId,
        new_status: BookingStatus,
        actor: &Actor,
    ) -> DomainResult<Booking> {
        self.reservations.update_status(booking_id, new_status, actor).await
    }

    pub async fn find_booking(&self, booking_id: BookingId) -> DomainResult<Booking> {
        self.reservations.find_booking(booking_id).await
    }

    pub async fn bookings_for_client(&self, client_id: &str) -> Vec<Booking> {
        self.reservations.bookings_for_client(client_id).await
    }

    pub async fn bookings_for_owner(&self, owner_id: &str) -> Vec<Booking> {
        self.reservations.bookings_for_owner(owner_id).await
    }

    // ── Reviews ─────────────────────────────────────────────────

    pub async fn add_review(
        &self,
        booking_id: BookingId,
        reviewer_id: &str,
        rating: u8,
        comment: &str,
    ) -> DomainResult<Review> {
        self.reviews
            .add_review(booking_id, reviewer_id, rating, comment)
            .await
    }

    pub async fn reviews_for_booking(&self, booking_id: BookingId) -> Vec<Review> {
        self.reviews.reviews_for_booking(booking_id).await
    }

    pub async fn reviews_for_vehicle(&self, vehicle_id: VehicleId) -> DomainResult<Vec<Review>> {
        self.reviews.reviews_for_vehicle(vehicle_id).await
    }

    pub async fn rating_summary_for_vehicle(&self, vehicle_id: VehicleId) -> DomainResult<RatingSummary> {
        self.reviews.rating_summary_for_vehicle(vehicle_id).await
    }

    pub async fn rating_summary_for_user(&self, user_id: &str) -> RatingSummary {
        self.reviews.rating_summary_for_user(user_id).await
    }

    // ── Catalog ─────────────────────────────────────────────────

    pub async fn list_vehicles(&self, viewer: Option<&Actor>, filter: &VehicleFilter) -> Vec<Vehicle> {
        self.catalog.list_vehicles(viewer, filter).await
    }

    pub async fn find_vehicle(&self, vehicle_id: VehicleId) -> DomainResult<Vehicle> {
        self.catalog.find_vehicle(vehicle_id).await
    }

    pub async fn add_vehicle(&self, actor: &Actor, dto: NewVehicleDto) -> DomainResult<Vehicle> {
        self.catalog.add_vehicle(actor, dto).await
    }

    pub async fn update_vehicle(
        &self,
        actor: &Actor,
        vehicle_id: VehicleId,
        dto: VehicleUpdateDto,
    ) -> DomainResult<Vehicle> {
        self.catalog.update_vehicle(actor, vehicle_id, dto).await
    }

    pub async fn remove_vehicle(&self, actor: &Actor, vehicle_id: VehicleId) -> DomainResult<Vehicle> {
        self.catalog.remove_vehicle(actor, vehicle_id).await
    }

    // ── Users ───────────────────────────────────────────────────

    pub async fn register_client(&self, dto: RegisterClientDto) -> DomainResult<User> {
        self.catalog.register_client(dto).await
    }

    pub async fn set_verification(&self, actor: &Actor, user_id: &str, verified: bool) -> DomainResult<User> {
        self.catalog.set_verification(actor, user_id, verified).await
    }

    pub async fn find_user(&self, user_id: &str) -> DomainResult<User> {
        self.catalog.find_user(user_id).await
    }
}

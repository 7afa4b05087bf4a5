//! Vehicle catalog and user directory
//!
//! Listing rules: a vehicle is discoverable while its lessor is verified.
//! Admins see every vehicle and a lessor always sees their own.

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::application::events::{Event, SharedEventBus, UserVerificationChangedEvent};
use crate::application::state::{next_id, MarketplaceState};
use crate::domain::{
    normalize_user_id, Actor, DomainError, DomainResult, NewVehicleDto, RegisterClientDto, User,
    UserRole, Vehicle, VehicleFilter, VehicleId, VehicleUpdateDto,
};
use rust_decimal::Decimal;

/// Whether `viewer` may see `vehicle`, given its owner's account.
pub fn is_discoverable(vehicle: &Vehicle, owner: Option<&User>, viewer: Option<&Actor>) -> bool {
    if let Some(viewer) = viewer {
        if viewer.is_admin() || viewer.user_id == vehicle.owner_id {
            return true;
        }
    }
    owner.is_some_and(|o| o.role == UserRole::Lessor && o.is_verified)
}

pub(crate) fn validation_error(err: validator::ValidationErrors) -> DomainError {
    DomainError::Validation(err.to_string())
}

fn ensure_positive_price(price: Decimal) -> DomainResult<()> {
    if price <= Decimal::ZERO {
        return Err(DomainError::Validation(format!(
            "daily price must be positive, got {}",
            price
        )));
    }
    Ok(())
}

fn ensure_owner_or_admin(actor: &Actor, vehicle: &Vehicle) -> DomainResult<()> {
    if actor.is_admin() || (actor.role == UserRole::Lessor && actor.user_id == vehicle.owner_id) {
        return Ok(());
    }
    Err(DomainError::Unauthorized(format!(
        "{} does not own vehicle {}",
        actor.user_id, vehicle.id
    )))
}

pub struct CatalogService {
    state: Arc<MarketplaceState>,
    events: SharedEventBus,
}

impl CatalogService {
    pub fn new(state: Arc<MarketplaceState>, events: SharedEventBus) -> Self {
        Self { state, events }
    }

    // ── Vehicles ────────────────────────────────────────────────

    /// Vehicles visible to `viewer` that match `filter`, ordered by id.
    /// `None` is an anonymous visitor.
    pub async fn list_vehicles(&self, viewer: Option<&Actor>, filter: &VehicleFilter) -> Vec<Vehicle> {
        let users = self.state.users.read().await;
        let vehicles = self.state.vehicles.read().await;

        let mut listed: Vec<Vehicle> = vehicles
            .iter()
            .filter(|v| {
                let owner = users.iter().find(|u| u.id == v.owner_id);
                is_discoverable(v, owner, viewer)
            })
            .filter(|v| filter.matches(v))
            .cloned()
            .collect();
        listed.sort_by_key(|v| v.id);
        listed
    }

    pub async fn find_vehicle(&self, id: VehicleId) -> DomainResult<Vehicle> {
        self.state
            .vehicles
            .read()
            .await
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Vehicle", "id", id))
    }

    pub async fn add_vehicle(&self, actor: &Actor, dto: NewVehicleDto) -> DomainResult<Vehicle> {
        if actor.role != UserRole::Lessor {
            return Err(DomainError::Unauthorized(format!(
                "only lessors list vehicles, {} is {}",
                actor.user_id, actor.role
            )));
        }
        dto.validate().map_err(validation_error)?;
        ensure_positive_price(dto.daily_price)?;

        let mut vehicles = self.state.vehicles.write().await;
        if vehicles
            .iter()
            .any(|v| v.license_plate.eq_ignore_ascii_case(&dto.license_plate))
        {
            return Err(DomainError::Conflict(format!(
                "license plate {} is already listed",
                dto.license_plate
            )));
        }

        let vehicle = Vehicle {
            id: next_id(vehicles.as_slice(), |v| v.id),
            owner_id: actor.user_id.clone(),
            brand: dto.brand,
            name: dto.name,
            year: dto.year,
            license_plate: dto.license_plate,
            daily_price: dto.daily_price,
            location: dto.location,
            specs: dto.specs,
            features: dto.features,
            image_urls: dto.image_urls,
        };
        vehicles.push(vehicle.clone());
        self.state.persist(vehicles.as_slice()).await;

        info!(vehicle_id = vehicle.id, owner_id = %vehicle.owner_id, "Vehicle listed");
        Ok(vehicle)
    }

    /// Descriptive fields are always editable. The price is frozen once a
    /// booking references the vehicle.
    pub async fn update_vehicle(
        &self,
        actor: &Actor,
        id: VehicleId,
        dto: VehicleUpdateDto,
    ) -> DomainResult<Vehicle> {
        dto.validate().map_err(validation_error)?;
        if let Some(price) = dto.daily_price {
            ensure_positive_price(price)?;
        }

        let mut vehicles = self.state.vehicles.write().await;
        let vehicle = vehicles
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| DomainError::not_found("Vehicle", "id", id))?;
        ensure_owner_or_admin(actor, vehicle)?;

        if dto.changes_price() && self.is_referenced(id).await {
            return Err(DomainError::Conflict(format!(
                "vehicle {} has bookings, its price can no longer change",
                id
            )));
        }

        if let Some(location) = dto.location {
            vehicle.location = location;
        }
        if let Some(features) = dto.features {
            vehicle.features = features;
        }
        if let Some(image_urls) = dto.image_urls {
            vehicle.image_urls = image_urls;
        }
        if let Some(price) = dto.daily_price {
            vehicle.daily_price = price;
        }
        let updated = vehicle.clone();
        self.state.persist(vehicles.as_slice()).await;

        info!(vehicle_id = id, actor = %actor.user_id, "Vehicle updated");
        Ok(updated)
    }

    /// Only vehicles no booking ever referenced can be removed.
    pub async fn remove_vehicle(&self, actor: &Actor, id: VehicleId) -> DomainResult<Vehicle> {
        let mut vehicles = self.state.vehicles.write().await;
        let index = vehicles
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| DomainError::not_found("Vehicle", "id", id))?;
        ensure_owner_or_admin(actor, &vehicles[index])?;

        if self.is_referenced(id).await {
            return Err(DomainError::Conflict(format!(
                "vehicle {} has bookings and cannot be removed",
                id
            )));
        }

        let removed = vehicles.remove(index);
        self.state.persist(vehicles.as_slice()).await;

        info!(vehicle_id = id, actor = %actor.user_id, "Vehicle removed");
        Ok(removed)
    }

    async fn is_referenced(&self, id: VehicleId) -> bool {
        self.state
            .bookings
            .read()
            .await
            .iter()
            .any(|b| b.vehicle_id == id)
    }

    // ── Users ───────────────────────────────────────────────────

    /// Create a client account. Identifiers are case-insensitive.
    pub async fn register_client(&self, dto: RegisterClientDto) -> DomainResult<User> {
        dto.validate().map_err(validation_error)?;

        let mut users = self.state.users.write().await;
        let id = normalize_user_id(&dto.username);
        if users.iter().any(|u| u.id == id) {
            return Err(DomainError::Conflict(format!("user {} already exists", id)));
        }

        let mut user = User::new(id, dto.name, UserRole::Client);
        user.phone = dto.phone;
        user.license_number = dto.license_number;

        users.push(user.clone());
        self.state.persist(users.as_slice()).await;

        info!(user_id = %user.id, "Client registered");
        Ok(user)
    }

    /// Record the outcome of the external identity verification.
    pub async fn set_verification(
        &self,
        actor: &Actor,
        user_id: &str,
        verified: bool,
    ) -> DomainResult<User> {
        if !actor.is_admin() {
            return Err(DomainError::Unauthorized(format!(
                "{} may not change verification status",
                actor.user_id
            )));
        }

        let id = normalize_user_id(user_id);
        let mut users = self.state.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DomainError::not_found("User", "id", &id))?;

        let changed = user.is_verified != verified;
        user.is_verified = verified;
        let updated = user.clone();
        if changed {
            self.state.persist(users.as_slice()).await;
        }
        drop(users);

        if changed {
            info!(user_id = %updated.id, verified, admin = %actor.user_id, "Verification changed");
            self.events
                .publish(Event::UserVerificationChanged(UserVerificationChangedEvent {
                    user_id: updated.id.clone(),
                    is_verified: verified,
                }));
        }
        Ok(updated)
    }

    pub async fn find_user(&self, user_id: &str) -> DomainResult<User> {
        let id = normalize_user_id(user_id);
        self.state
            .users
            .read()
            .await
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("User", "id", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::model::fixtures::sedan;

    fn lessor(verified: bool) -> User {
        let user = User::new("ana", "Ana", UserRole::Lessor);
        if verified {
            user.verified()
        } else {
            user
        }
    }

    #[test]
    fn verified_lessor_vehicles_are_public() {
        let vehicle = sedan(1, "ana", 100);
        let client = Actor::new("juan", UserRole::Client);

        assert!(is_discoverable(&vehicle, Some(&lessor(true)), Some(&client)));
        assert!(is_discoverable(&vehicle, Some(&lessor(true)), None));
        assert!(!is_discoverable(&vehicle, Some(&lessor(false)), Some(&client)));
        assert!(!is_discoverable(&vehicle, None, Some(&client)));
    }

    #[test]
    fn admins_and_owners_always_see_the_vehicle() {
        let vehicle = sedan(1, "ana", 100);
        let owner = Actor::new("ana", UserRole::Lessor);
        let admin = Actor::admin("root");

        assert!(is_discoverable(&vehicle, Some(&lessor(false)), Some(&owner)));
        assert!(is_discoverable(&vehicle, Some(&lessor(false)), Some(&admin)));
    }

    #[test]
    fn only_owner_or_admin_may_edit() {
        let vehicle = sedan(1, "ana", 100);
        assert!(ensure_owner_or_admin(&Actor::new("ana", UserRole::Lessor), &vehicle).is_ok());
        assert!(ensure_owner_or_admin(&Actor::admin("root"), &vehicle).is_ok());
        assert!(matches!(
            ensure_owner_or_admin(&Actor::new("ana", UserRole::Client), &vehicle),
            Err(DomainError::Unauthorized(_))
        ));
    }
}

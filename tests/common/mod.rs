#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use carshare::config::AppConfig;
use carshare::domain::{
    CollectionStore, Fuel, Storage, Transmission, User, UserRole, Vehicle, VehicleSpecs,
};
use carshare::Marketplace;

pub const VERIFIED_CAR: u64 = 1;
pub const UNVERIFIED_CAR: u64 = 2;

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

pub fn vehicle(id: u64, owner: &str, daily_price: i64) -> Vehicle {
    Vehicle {
        id,
        owner_id: owner.to_string(),
        brand: "Nissan".into(),
        name: "Versa".into(),
        year: 2021,
        license_plate: format!("JAL-{:04}", id),
        daily_price: Decimal::from(daily_price),
        location: "Zapopan".into(),
        specs: VehicleSpecs {
            vehicle_type: "Sedan".into(),
            passengers: 5,
            transmission: Transmission::Manual,
            fuel: Fuel::Gasoline,
        },
        features: vec!["A/C".into()],
        image_urls: Vec::new(),
    }
}

pub fn users() -> Vec<User> {
    vec![
        User::new("ana", "Ana Arrendadora", UserRole::Lessor).verified(),
        User::new("pedro", "Pedro Nuevo", UserRole::Lessor),
        User::new("juan", "Juan Cliente", UserRole::Client).verified(),
        User::new("maria", "Maria Cliente", UserRole::Client),
        User::new("root", "Admin", UserRole::Admin).verified(),
    ]
}

/// Seed users and two vehicles: 1 (ana, verified, 100/day) and
/// 2 (pedro, unverified, 80/day).
pub async fn seed(storage: Arc<dyn Storage>) {
    let store = CollectionStore::new(storage);
    store.save(&users()).await.unwrap();
    store
        .save(&[
            vehicle(VERIFIED_CAR, "ana", 100),
            vehicle(UNVERIFIED_CAR, "pedro", 80),
        ])
        .await
        .unwrap();
}

pub fn config(auto_confirm: bool) -> AppConfig {
    let mut config = AppConfig::in_memory();
    config.booking.auto_confirm = auto_confirm;
    config
}

pub async fn market_on(storage: Arc<dyn Storage>, auto_confirm: bool) -> Marketplace {
    seed(storage.clone()).await;
    Marketplace::with_storage(&config(auto_confirm), storage)
        .await
        .unwrap()
}

pub async fn market(auto_confirm: bool) -> Marketplace {
    market_on(Arc::new(carshare::infrastructure::InMemoryStorage::new()), auto_confirm).await
}

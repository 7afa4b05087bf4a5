use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::VehicleSpecs;

/// Listing request from a lessor
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicleDto {
    #[validate(length(min = 1, max = 50))]
    pub brand: String,
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(range(min = 1950, max = 2100))]
    pub year: u16,
    #[validate(length(min = 3, max = 15))]
    pub license_plate: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub daily_price: Decimal,
    #[validate(length(min = 1, max = 100))]
    pub location: String,
    pub specs: VehicleSpecs,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Partial update. Descriptive fields are always editable; `daily_price`
/// only while no booking references the vehicle.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VehicleUpdateDto {
    #[validate(length(min = 1, max = 100))]
    pub location: Option<String>,
    pub features: Option<Vec<String>>,
    pub image_urls: Option<Vec<String>>,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub daily_price: Option<Decimal>,
}

impl VehicleUpdateDto {
    pub fn changes_price(&self) -> bool {
        self.daily_price.is_some()
    }
}

//! Vehicle catalog entity

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

pub type VehicleId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Automatic,
    Manual,
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Automatic => write!(f, "automatic"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fuel {
    Gasoline,
    Diesel,
    Electric,
    Hybrid,
}

impl fmt::Display for Fuel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gasoline => write!(f, "gasoline"),
            Self::Diesel => write!(f, "diesel"),
            Self::Electric => write!(f, "electric"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSpecs {
    /// Body type, e.g. "Sedan" or "SUV"
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub passengers: u8,
    pub transmission: Transmission,
    pub fuel: Fuel,
}

/// A listed vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: VehicleId,
    /// Lessor account owning the vehicle
    pub owner_id: UserId,
    pub brand: String,
    pub name: String,
    pub year: u16,
    pub license_plate: String,
    /// Price per rental day, always positive
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub daily_price: Decimal,
    pub location: String,
    pub specs: VehicleSpecs,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl Vehicle {
    pub fn display_name(&self) -> String {
        format!("{} {} ({})", self.brand, self.name, self.year)
    }
}

/// Catalog search criteria. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFilter {
    pub vehicle_type: Option<String>,
    pub max_daily_price: Option<Decimal>,
    pub transmission: Option<Transmission>,
    pub fuel: Option<Fuel>,
}

impl VehicleFilter {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        if let Some(ref wanted) = self.vehicle_type {
            if !vehicle.specs.vehicle_type.eq_ignore_ascii_case(wanted) {
                return false;
            }
        }
        if let Some(max) = self.max_daily_price {
            if vehicle.daily_price > max {
                return false;
            }
        }
        if let Some(transmission) = self.transmission {
            if vehicle.specs.transmission != transmission {
                return false;
            }
        }
        if let Some(fuel) = self.fuel {
            if vehicle.specs.fuel != fuel {
                return false;
            }
        }
        true
    }
}

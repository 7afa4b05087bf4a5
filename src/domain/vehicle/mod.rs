//! Vehicle aggregate

pub mod model;

mod dto;

pub use dto::{NewVehicleDto, VehicleUpdateDto};
pub use model::{Fuel, Transmission, Vehicle, VehicleFilter, VehicleId, VehicleSpecs};

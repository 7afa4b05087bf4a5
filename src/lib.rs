//! # Carshare reservation engine
//!
//! Reservation and availability engine of a peer-to-peer vehicle rental
//! marketplace: date selection against blocked days, pricing, the booking
//! state machine, post-rental reviews and write-through persistence.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Entities, value types and the storage port
//! - **application**: Availability, pricing, selector, services and events
//! - **infrastructure**: Storage backends (JSON files, in-memory)
//! - **marketplace**: Facade wiring everything together

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod marketplace;
pub mod shared;
pub mod telemetry;

pub use config::{default_config_path, AppConfig};
pub use marketplace::Marketplace;
pub use telemetry::init_tracing;

// Re-export events
pub use application::events::{create_event_bus, Event, EventBus, SharedEventBus};

pub use shared::errors::{AppError, DomainError, ErrorKind, InfraError};

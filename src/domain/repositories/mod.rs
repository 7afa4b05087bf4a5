//! Persistence port for the domain layer
//!
//! Contains:
//! - `Storage` — backend contract: one JSON document per named collection
//! - `CollectionStore` — typed `load` / `save` of whole collections
//! - `DomainResult` — standard result type for domain operations

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Booking, Review, User, Vehicle};
use crate::shared::errors::{DomainError, InfraError};

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Named collections kept by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Vehicles,
    Bookings,
    Reviews,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Self::Users,
        Self::Vehicles,
        Self::Bookings,
        Self::Reviews,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Vehicles => "vehicles",
            Self::Bookings => "bookings",
            Self::Reviews => "reviews",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Storage ─────────────────────────────────────────────────────

/// Key-value backend holding one serialized document per collection.
///
/// Implementations only move bytes; (de)serialization happens in
/// [`CollectionStore`] so every backend shares the same layout.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stored document, or `None` if the collection was never written.
    async fn read(&self, collection: Collection) -> Result<Option<String>, InfraError>;

    /// Replace the whole document of a collection.
    async fn write(&self, collection: Collection, document: String) -> Result<(), InfraError>;
}

/// A type persisted as the element of one collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;
}

impl Record for Vehicle {
    const COLLECTION: Collection = Collection::Vehicles;
}

impl Record for Booking {
    const COLLECTION: Collection = Collection::Bookings;
}

impl Record for Review {
    const COLLECTION: Collection = Collection::Reviews;
}

// ── CollectionStore ─────────────────────────────────────────────

/// Typed whole-collection access on top of any [`Storage`] backend.
///
/// ```ignore
/// let store = CollectionStore::new(Arc::new(InMemoryStorage::new()));
/// let bookings: Vec<Booking> = store.load().await?;
/// store.save(&bookings).await?;
/// ```
#[derive(Clone)]
pub struct CollectionStore {
    storage: Arc<dyn Storage>,
}

impl CollectionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Load every record of `T`'s collection. A missing collection is empty.
    pub async fn load<T: Record>(&self) -> Result<Vec<T>, InfraError> {
        match self.storage.read(T::COLLECTION).await? {
            Some(document) if !document.trim().is_empty() => {
                Ok(serde_json::from_str(&document)?)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Overwrite `T`'s collection with `records`.
    pub async fn save<T: Record>(&self, records: &[T]) -> Result<(), InfraError> {
        let document = serde_json::to_string_pretty(records)?;
        self.storage.write(T::COLLECTION, document).await
    }
}

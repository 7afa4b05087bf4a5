//! In-memory marketplace state
//!
//! The collections loaded at startup are authoritative for the running
//! session. Every mutation is written through to the store while the
//! collection's write guard is still held, so saves land in commit order.
//!
//! Lock order when more than one collection is needed:
//! users -> vehicles -> bookings -> reviews.

use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::domain::{Booking, Collection, CollectionStore, Record, Review, User, Vehicle};
use crate::shared::errors::InfraError;

pub struct MarketplaceState {
    store: CollectionStore,
    pub(crate) users: RwLock<Vec<User>>,
    pub(crate) vehicles: RwLock<Vec<Vehicle>>,
    pub(crate) bookings: RwLock<Vec<Booking>>,
    pub(crate) reviews: RwLock<Vec<Review>>,
}

impl MarketplaceState {
    /// Load all four collections. A load failure is fatal: starting from an
    /// empty view would overwrite the stored data on the first mutation.
    pub async fn load(store: CollectionStore) -> Result<Self, InfraError> {
        let users: Vec<User> = store.load().await?;
        let vehicles: Vec<Vehicle> = store.load().await?;
        let bookings: Vec<Booking> = store.load().await?;
        ensure_ordered_ranges(&bookings)?;
        let reviews: Vec<Review> = store.load().await?;

        debug!(
            users = users.len(),
            vehicles = vehicles.len(),
            bookings = bookings.len(),
            reviews = reviews.len(),
            "Marketplace state loaded"
        );

        Ok(Self {
            store,
            users: RwLock::new(users),
            vehicles: RwLock::new(vehicles),
            bookings: RwLock::new(bookings),
            reviews: RwLock::new(reviews),
        })
    }

    /// Write `records` through to the store. Failures are logged and
    /// swallowed; the in-memory mutation stands.
    pub(crate) async fn persist<T: Record>(&self, records: &[T]) {
        if let Err(e) = self.store.save(records).await {
            let collection = T::COLLECTION;
            error!(
                %collection,
                records = records.len(),
                error = %e,
                "Write-through failed, keeping in-memory state"
            );
        }
    }
}

/// Refuse stored bookings whose end precedes their start; they would
/// block fewer dates than they claim.
fn ensure_ordered_ranges(bookings: &[Booking]) -> Result<(), InfraError> {
    match bookings.iter().find(|b| b.end_date < b.start_date) {
        Some(b) => Err(InfraError::Corrupt {
            collection: Collection::Bookings,
            reason: format!(
                "booking {} ends {} before it starts {}",
                b.id, b.end_date, b.start_date
            ),
        }),
        None => Ok(()),
    }
}

/// Next identifier of a collection keyed by `u64`.
pub(crate) fn next_id<T>(records: &[T], id: impl Fn(&T) -> u64) -> u64 {
    records.iter().map(id).max().unwrap_or(0) + 1
}

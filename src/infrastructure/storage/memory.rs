//! In-memory storage implementation

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;

use crate::domain::{Collection, Storage};
use crate::shared::errors::InfraError;

/// In-memory storage for development and testing
///
/// Keeps the serialized document of every collection, so records go
/// through the same JSON layout as the file backend.
#[derive(Default)]
pub struct InMemoryStorage {
    documents: DashMap<Collection, String>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw document currently held for `collection`.
    pub fn document(&self, collection: Collection) -> Option<String> {
        self.documents.get(&collection).map(|d| d.value().clone())
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn read(&self, collection: Collection) -> Result<Option<String>, InfraError> {
        Ok(self.document(collection))
    }

    async fn write(&self, collection: Collection, document: String) -> Result<(), InfraError> {
        debug!("Writing {} ({} bytes) to memory", collection, document.len());
        self.documents.insert(collection, document);
        Ok(())
    }
}

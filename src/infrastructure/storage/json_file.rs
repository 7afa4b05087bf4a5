//! File-based storage: one pretty-printed JSON file per collection
//!
//! Layout under the data directory:
//! `users.json`, `vehicles.json`, `bookings.json`, `reviews.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, warn};

use crate::domain::{Collection, Storage};
use crate::shared::errors::InfraError;

pub struct JsonFileStorage {
    data_dir: PathBuf,
}

impl JsonFileStorage {
    /// Open (and create if needed) a data directory.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, InfraError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;
        debug!("JSON storage opened at {}", data_dir.display());
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection.name()))
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn read(&self, collection: Collection) -> Result<Option<String>, InfraError> {
        let path = self.path_for(collection);
        match tokio::fs::read_to_string(&path).await {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} not found, starting empty", path.display());
                Ok(None)
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                Err(e.into())
            }
        }
    }

    async fn write(&self, collection: Collection, document: String) -> Result<(), InfraError> {
        let path = self.path_for(collection);
        let tmp = path.with_extension("json.tmp");

        // Write-then-rename keeps the previous file intact if the write fails
        tokio::fs::write(&tmp, document.as_bytes()).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!("Wrote {} ({} bytes)", path.display(), document.len());
        Ok(())
    }
}

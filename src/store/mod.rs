//! Slot persistence.
//!
//! A [`SlotStore`] holds raw string blobs under named slots. [`RecordStore`]
//! sits on top of it and mirrors whole typed lists as JSON arrays.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::config::{StoreBackend, StoreSettings};

pub mod file;
pub mod memory;
pub mod postgres;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::PgSlotStore;

pub const UNIT_PRODUCTS_SLOT: &str = "alatSatuanProducts";
pub const GROUPED_PRODUCTS_SLOT: &str = "alatKelompokProducts";
pub const PAYMENTS_SLOT: &str = "dummyPaymentData";
pub const AUDIT_SLOT: &str = "auditLog";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded writing {slot} ({needed} of {quota} bytes)")]
    QuotaExceeded {
        slot: String,
        needed: usize,
        quota: usize,
    },

    #[error("invalid slot name {0:?}")]
    InvalidSlot(String),

    #[error("storage io error")]
    Io(#[from] std::io::Error),

    #[error("serialization error")]
    Serialize(#[from] serde_json::Error),

    #[error("database error")]
    Database(#[from] sea_orm::DbErr),
}

/// Raw key-value blob storage.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Returns `None` when nothing has been written to `slot` yet.
    async fn read(&self, slot: &str) -> Result<Option<String>, StoreError>;

    async fn write(&self, slot: &str, blob: String) -> Result<(), StoreError>;
}

/// Typed view over a [`SlotStore`]. Cheap to clone.
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn SlotStore>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}

impl RecordStore {
    pub fn new(backend: impl SlotStore + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn memory() -> Self {
        Self::new(MemoryStore::default())
    }

    /// Reads a list back from `slot`.
    ///
    /// Fails soft: a missing slot, an unreadable backend or content that does
    /// not parse all yield `None`, and the caller substitutes its default.
    pub async fn load<T: DeserializeOwned>(&self, slot: &str) -> Option<Vec<T>> {
        let blob = match self.backend.read(slot).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(slot, error = %err, "slot read failed");
                return None;
            }
        };

        match serde_json::from_str(&blob) {
            Ok(items) => Some(items),
            Err(err) => {
                tracing::warn!(slot, error = %err, "slot content is not a valid list");
                None
            }
        }
    }

    /// Checks that the backend answers a read.
    pub async fn probe(&self) -> Result<(), StoreError> {
        self.backend.read(AUDIT_SLOT).await.map(|_| ())
    }

    pub async fn save<T: Serialize>(&self, slot: &str, items: &[T]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(items)?;
        self.backend.write(slot, blob).await?;
        tracing::debug!(slot, count = items.len(), "slot saved");
        Ok(())
    }
}

/// The result of a mutation whose in-memory effect always stands.
///
/// `warning` is set when mirroring the list to its slot failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Persisted<T> {
    pub value: T,
    pub warning: Option<String>,
}

impl<T> Persisted<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }
}

/// Builds the store selected by configuration.
pub async fn open(settings: &StoreSettings) -> anyhow::Result<RecordStore> {
    let store = match settings.backend {
        StoreBackend::Memory => match settings.quota_bytes {
            Some(quota) => RecordStore::new(MemoryStore::with_quota(quota)),
            None => RecordStore::memory(),
        },
        StoreBackend::File => RecordStore::new(FileStore::new(&settings.data_dir)),
        StoreBackend::Postgres => {
            let url = settings
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;
            let conn = crate::db::create_orm_conn(url).await?;
            RecordStore::new(PgSlotStore::new(conn))
        }
    };
    tracing::info!(backend = ?settings.backend, "record store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_of_missing_slot_is_none() {
        let store = RecordStore::memory();
        let items: Option<Vec<u32>> = store.load("nothing").await;
        assert!(items.is_none());
    }

    #[tokio::test]
    async fn load_of_garbage_is_none() {
        let backend = MemoryStore::default();
        backend.write("broken", "{not json".into()).await.unwrap();
        let store = RecordStore::new(backend);
        let items: Option<Vec<u32>> = store.load("broken").await;
        assert!(items.is_none());
    }

    #[tokio::test]
    async fn empty_list_survives_round_trip() {
        let store = RecordStore::memory();
        store.save::<u32>("numbers", &[]).await.unwrap();
        let items: Option<Vec<u32>> = store.load("numbers").await;
        assert_eq!(items, Some(vec![]));
    }
}

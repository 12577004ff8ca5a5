use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{SlotStore, StoreError};

/// In-process slot store.
///
/// An optional byte quota caps the combined size of all keys and blobs, the
/// way a browser caps its local storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.lock().await.get(slot).cloned())
    }

    async fn write(&self, slot: &str, blob: String) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().await;

        if let Some(quota) = self.quota {
            let others: usize = slots
                .iter()
                .filter(|(key, _)| key.as_str() != slot)
                .map(|(key, value)| key.len() + value.len())
                .sum();
            let needed = others + slot.len() + blob.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded {
                    slot: slot.to_owned(),
                    needed,
                    quota,
                });
            }
        }

        slots.insert(slot.to_owned(), blob);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn quota_rejects_oversized_write_and_keeps_old_blob() {
        let store = MemoryStore::with_quota(16);
        store.write("k", "[1]".into()).await.unwrap();

        let err = store.write("k", "x".repeat(64)).await.unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert_eq!(store.read("k").await.unwrap().as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn rewriting_a_slot_does_not_count_its_old_blob() {
        let store = MemoryStore::with_quota(10);
        store.write("k", "12345678".into()).await.unwrap();
        store.write("k", "87654321".into()).await.unwrap();
        assert_eq!(store.read("k").await.unwrap().as_deref(), Some("87654321"));
    }
}

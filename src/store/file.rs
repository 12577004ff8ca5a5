use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{SlotStore, StoreError};

/// One JSON file per slot under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, StoreError> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidSlot(slot.to_owned()));
        }
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

#[async_trait]
impl SlotStore for FileStore {
    async fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(slot)?;
        match fs::read_to_string(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&self, slot: &str, blob: String) -> Result<(), StoreError> {
        let path = self.slot_path(slot)?;
        fs::create_dir_all(&self.dir).await?;

        // Write beside the target, then rename over it.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, blob).await?;
        fs::rename(&staging, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_and_reads_back_a_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));

        assert_eq!(store.read("alatSatuanProducts").await.unwrap(), None);
        store
            .write("alatSatuanProducts", "[]".into())
            .await
            .unwrap();
        assert_eq!(
            store.read("alatSatuanProducts").await.unwrap().as_deref(),
            Some("[]")
        );
        assert!(dir.path().join("data/alatSatuanProducts.json").exists());
    }

    #[tokio::test]
    async fn rejects_path_like_slot_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let err = store.write("../escape", "[]".into()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidSlot(_)));
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::area::{AreaName, StorageArea};
use crate::error::Result;
use crate::memory::MemoryArea;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    /// Keep the local partition on disk as well; otherwise it lives only as
    /// long as the process.
    pub persist_local: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("taskclock"), persist_local: true }
    }
}

impl StoreConfig {
    pub fn sync_path(&self) -> PathBuf {
        self.data_dir.join("sync.json")
    }

    pub fn local_path(&self) -> PathBuf {
        self.data_dir.join("local.json")
    }
}

/// Handle to both partitions. Cloning shares the underlying areas.
#[derive(Clone)]
pub struct KeyValueStore {
    sync: Arc<dyn StorageArea>,
    local: Arc<dyn StorageArea>,
}

impl KeyValueStore {
    pub fn new(sync: Arc<dyn StorageArea>, local: Arc<dyn StorageArea>) -> Self {
        Self { sync, local }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryArea::new(AreaName::Sync)),
            Arc::new(MemoryArea::new(AreaName::Local)),
        )
    }

    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let sync = MemoryArea::open(AreaName::Sync, config.sync_path()).await?;
        let local = if config.persist_local {
            MemoryArea::open(AreaName::Local, config.local_path()).await?
        } else {
            MemoryArea::new(AreaName::Local)
        };

        info!("Key/value store opened in {}", config.data_dir.display());
        Ok(Self::new(Arc::new(sync), Arc::new(local)))
    }

    pub fn sync(&self) -> &Arc<dyn StorageArea> {
        &self.sync
    }

    pub fn local(&self) -> &Arc<dyn StorageArea> {
        &self.local
    }

    pub fn area(&self, name: AreaName) -> &Arc<dyn StorageArea> {
        match name {
            AreaName::Sync => &self.sync,
            AreaName::Local => &self.local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskclock_common::Entries;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_partitions_are_independent() {
        let store = KeyValueStore::in_memory();
        let mut items = Entries::new();
        items.insert("taskActive".to_string(), json!(true));
        store.local().set(items).await.unwrap();

        assert!(store.sync().get(&["taskActive"]).await.unwrap().is_empty());
        assert_eq!(store.area(AreaName::Local).get(&["taskActive"]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_creates_both_files() {
        let dir = tempdir().unwrap();
        let config = StoreConfig { data_dir: dir.path().join("data"), persist_local: true };

        let store = KeyValueStore::open(&config).await.unwrap();
        assert!(config.sync_path().exists());
        assert!(config.local_path().exists());
        assert_eq!(store.sync().name(), AreaName::Sync);
    }

    #[tokio::test]
    async fn test_volatile_local_partition() {
        let dir = tempdir().unwrap();
        let config = StoreConfig { data_dir: dir.path().to_path_buf(), persist_local: false };

        let _store = KeyValueStore::open(&config).await.unwrap();
        assert!(config.sync_path().exists());
        assert!(!config.local_path().exists());
    }
}

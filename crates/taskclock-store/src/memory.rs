use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use taskclock_common::Entries;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::area::{AreaName, StorageArea, StorageChange, ValueChange};
use crate::error::{Result, StoreError};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// In-memory partition, optionally mirrored to a flat JSON object on disk.
pub struct MemoryArea {
    name: AreaName,
    entries: RwLock<Entries>,
    changes: broadcast::Sender<StorageChange>,
    path: Option<PathBuf>,
}

impl MemoryArea {
    /// A volatile partition that starts empty.
    pub fn new(name: AreaName) -> Self {
        Self::with_entries(name, Entries::new(), None)
    }

    /// Load the partition from `path`, creating the file when it is missing.
    /// Every later `set` rewrites the file.
    pub async fn open(name: AreaName, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent).await?;
                info!("Created store directory: {}", parent.display());
            }
        }

        let entries = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            parse_entries(&content)
                .map_err(|reason| StoreError::Corrupt(format!("{}: {}", path.display(), reason)))?
        } else {
            info!("Creating {} store at {}", name, path.display());
            write_entries(&path, &Entries::new()).await?;
            Entries::new()
        };

        debug!("Loaded {} keys into {} store", entries.len(), name);
        Ok(Self::with_entries(name, entries, Some(path)))
    }

    fn with_entries(name: AreaName, entries: Entries, path: Option<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { name, entries: RwLock::new(entries), changes, path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[async_trait]
impl StorageArea for MemoryArea {
    fn name(&self) -> AreaName {
        self.name
    }

    async fn get(&self, keys: &[&str]) -> Result<Entries> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    async fn get_all(&self) -> Result<Entries> {
        Ok(self.entries.read().await.clone())
    }

    /// Applies the whole batch or nothing: the file is rewritten first and
    /// the in-memory map only changes once that write succeeded.
    async fn set(&self, items: Entries) -> Result<()> {
        let mut changes = HashMap::new();
        {
            let mut entries = self.entries.write().await;
            let mut updated = entries.clone();
            for (key, new_value) in items {
                let old_value = updated.insert(key.clone(), new_value.clone());
                if old_value.as_ref() != Some(&new_value) {
                    changes.insert(key, ValueChange { old_value, new_value: Some(new_value) });
                }
            }

            if let Some(path) = &self.path {
                write_entries(path, &updated).await?;
            }
            *entries = updated;
        }

        if changes.is_empty() {
            return Ok(());
        }

        debug!("{} store changed: {:?}", self.name, changes.keys().collect::<Vec<_>>());
        // No subscribers is not an error.
        let _ = self.changes.send(StorageChange { area: self.name, changes });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}

fn parse_entries(content: &str) -> std::result::Result<Entries, String> {
    if content.trim().is_empty() {
        return Ok(Entries::new());
    }
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(other) => Err(format!("expected a JSON object, found {}", other)),
        Err(e) => Err(e.to_string()),
    }
}

async fn write_entries(path: &Path, entries: &Entries) -> Result<()> {
    let sorted: BTreeMap<&String, &Value> = entries.iter().collect();
    let content = serde_json::to_string_pretty(&sorted)?;

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, content).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn batch(items: &[(&str, Value)]) -> Entries {
        items.iter().map(|(key, value)| (key.to_string(), value.clone())).collect()
    }

    #[tokio::test]
    async fn test_get_skips_absent_keys() {
        let area = MemoryArea::new(AreaName::Sync);
        area.set(batch(&[("a", json!(1))])).await.unwrap();

        let result = area.get(&["a", "b"]).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result["a"], json!(1));
    }

    #[tokio::test]
    async fn test_set_publishes_one_change_per_batch() {
        let area = MemoryArea::new(AreaName::Local);
        let mut rx = area.subscribe();

        area.set(batch(&[("taskActive", json!(true)), ("taskTime", json!(30))])).await.unwrap();

        let change = rx.recv().await.unwrap();
        assert_eq!(change.area, AreaName::Local);
        assert_eq!(change.changes.len(), 2);
        assert_eq!(
            change.changes["taskActive"],
            ValueChange { old_value: None, new_value: Some(json!(true)) }
        );
    }

    #[tokio::test]
    async fn test_change_carries_old_value() {
        let area = MemoryArea::new(AreaName::Sync);
        area.set(batch(&[("6/10/2024", json!(10.0))])).await.unwrap();

        let mut rx = area.subscribe();
        area.set(batch(&[("6/10/2024", json!(40.0))])).await.unwrap();

        let change = rx.recv().await.unwrap();
        assert_eq!(change.changes["6/10/2024"].old_value, Some(json!(10.0)));
        assert_eq!(change.changes["6/10/2024"].new_value, Some(json!(40.0)));
    }

    #[tokio::test]
    async fn test_unchanged_values_are_not_reported() {
        let area = MemoryArea::new(AreaName::Sync);
        area.set(batch(&[("minTime", json!(30))])).await.unwrap();

        let mut rx = area.subscribe();
        area.set(batch(&[("minTime", json!(30))])).await.unwrap();
        area.set(batch(&[("maxTime", json!(60))])).await.unwrap();

        let change = rx.recv().await.unwrap();
        assert!(change.changes.contains_key("maxTime"));
        assert!(!change.changes.contains_key("minTime"));
    }

    #[tokio::test]
    async fn test_file_backed_area_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("sync.json");

        let area = MemoryArea::open(AreaName::Sync, &path).await.unwrap();
        assert!(path.exists());
        area.set(batch(&[("dailyHourGoal", json!(7.5)), ("taskWebsiteURLSetting", json!(""))]))
            .await
            .unwrap();
        drop(area);

        let reopened = MemoryArea::open(AreaName::Sync, &path).await.unwrap();
        let all = reopened.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["dailyHourGoal"], json!(7.5));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_area_untouched() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let path = data_dir.join("sync.json");

        let area = MemoryArea::open(AreaName::Sync, &path).await.unwrap();
        area.set(batch(&[("6/10/2024", json!(10.0))])).await.unwrap();

        let mut rx = area.subscribe();
        std::fs::remove_dir_all(&data_dir).unwrap();

        let result = area.set(batch(&[("6/10/2024", json!(40.0)), ("minTime", json!(30))])).await;

        assert!(matches!(result, Err(StoreError::Io(_))));
        let all = area.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all["6/10/2024"], json!(10.0));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_non_object_file_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let result = MemoryArea::open(AreaName::Local, &path).await;
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_empty_file_loads_as_empty_area() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local.json");
        std::fs::write(&path, "").unwrap();

        let area = MemoryArea::open(AreaName::Local, &path).await.unwrap();
        assert!(area.get_all().await.unwrap().is_empty());
    }
}

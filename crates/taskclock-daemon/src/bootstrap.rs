use anyhow::{Context, Result};
use taskclock_common::Settings;
use taskclock_store::KeyValueStore;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    /// No settings have been stored yet.
    Install,
    Startup,
}

impl InstallReason {
    /// Install until at least one setting has been stored. A run that died
    /// before writing the defaults is still treated as an install.
    pub async fn detect(store: &KeyValueStore) -> Result<Self> {
        let defaults = Settings::default().to_entries()?;
        let names: Vec<&str> = defaults.keys().map(String::as_str).collect();
        let stored = store.sync().get(&names).await.context("Failed to read settings")?;

        Ok(if stored.is_empty() { Self::Install } else { Self::Startup })
    }
}

/// Write the default settings on first install. Returns whether anything was written.
pub async fn on_installed(store: &KeyValueStore, reason: InstallReason) -> Result<bool> {
    if reason != InstallReason::Install {
        debug!("Skipping default settings ({:?})", reason);
        return Ok(false);
    }

    let defaults = Settings::default().to_entries()?;
    let count = defaults.len();
    store.sync().set(defaults).await.context("Failed to write default settings")?;

    info!("First install: wrote {} default settings", count);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskclock_common::{keys, Entries};
    use taskclock_store::StoreConfig;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_install_writes_defaults() {
        let store = KeyValueStore::in_memory();

        assert!(on_installed(&store, InstallReason::Install).await.unwrap());

        let all = store.sync().get_all().await.unwrap();
        assert_eq!(all.len(), 22);
        assert_eq!(all[keys::GOAL_NOTIFICATIONS], json!(true));
        assert!(store.local().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_startup_leaves_settings_alone() {
        let store = KeyValueStore::in_memory();
        let mut custom = Entries::new();
        custom.insert(keys::DAILY_HOUR_GOAL.to_string(), json!(6.5));
        store.sync().set(custom).await.unwrap();

        assert!(!on_installed(&store, InstallReason::Startup).await.unwrap());

        let all = store.sync().get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[keys::DAILY_HOUR_GOAL], json!(6.5));
    }

    #[tokio::test]
    async fn test_reinstall_overwrites_with_same_defaults() {
        let store = KeyValueStore::in_memory();
        on_installed(&store, InstallReason::Install).await.unwrap();
        let first = store.sync().get_all().await.unwrap();

        on_installed(&store, InstallReason::Install).await.unwrap();
        assert_eq!(store.sync().get_all().await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_detect_install_until_settings_are_stored() {
        let store = KeyValueStore::in_memory();
        assert_eq!(InstallReason::detect(&store).await.unwrap(), InstallReason::Install);

        let mut day = Entries::new();
        day.insert("6/10/2024".to_string(), json!(30));
        store.sync().set(day).await.unwrap();
        assert_eq!(InstallReason::detect(&store).await.unwrap(), InstallReason::Install);

        on_installed(&store, InstallReason::Install).await.unwrap();
        assert_eq!(InstallReason::detect(&store).await.unwrap(), InstallReason::Startup);
    }

    #[tokio::test]
    async fn test_interrupted_first_run_installs_on_next_start() {
        let dir = tempdir().unwrap();
        let config = StoreConfig { data_dir: dir.path().to_path_buf(), persist_local: true };

        let store = KeyValueStore::open(&config).await.unwrap();
        assert_eq!(InstallReason::detect(&store).await.unwrap(), InstallReason::Install);
        drop(store);

        let reopened = KeyValueStore::open(&config).await.unwrap();
        let reason = InstallReason::detect(&reopened).await.unwrap();
        assert_eq!(reason, InstallReason::Install);
        assert!(on_installed(&reopened, reason).await.unwrap());
        drop(reopened);

        let restarted = KeyValueStore::open(&config).await.unwrap();
        assert_eq!(InstallReason::detect(&restarted).await.unwrap(), InstallReason::Startup);
        let all = restarted.sync().get_all().await.unwrap();
        assert_eq!(all[keys::DAILY_HOUR_GOAL], json!(8.0));
    }
}

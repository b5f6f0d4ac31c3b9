use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use taskclock_common::config::DbusConfig;
use taskclock_store::StoreConfig;
use tracing::{debug, info, warn};

/// Overrides `[storage] data_dir` when set.
pub const DATA_DIR_ENV: &str = "TASKCLOCK_DATA_DIR";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DaemonConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub badge: BadgeConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub resume: ResumeConfig,

    #[serde(default)]
    pub dbus: DbusConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub persist_local: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir =
            dirs::data_dir().unwrap_or_else(|| PathBuf::from("/tmp")).join("taskclock");

        Self { data_dir: data_dir.to_string_lossy().to_string(), persist_local: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BadgeConfig {
    /// File that receives the countdown text; the badge is only logged when unset.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub desktop: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { desktop: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResumeConfig {
    pub poll_seconds: u64,
    /// Wall-clock time beyond the poll interval that counts as a suspend.
    pub threshold_seconds: u64,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self { poll_seconds: 5, threshold_seconds: 10 }
    }
}

impl DaemonConfig {
    /// Default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("taskclock")
            .join("daemon.toml")
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        debug!("Loading daemon configuration from {:?}", config_path);

        if !config_path.exists() {
            info!(
                "Configuration file not found at {:?}, creating default configuration",
                config_path
            );
            let default_config = Self::default();
            default_config.save_to_path(config_path)?;
            return Ok(default_config);
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: DaemonConfig = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        info!("Loaded daemon configuration from {:?}", config_path);
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        debug!("Saving daemon configuration to {:?}", config_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let config_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Saved daemon configuration to {:?}", config_path);
        Ok(())
    }

    /// Store location, honouring the `TASKCLOCK_DATA_DIR` override
    pub fn store_config(&self) -> StoreConfig {
        let data_dir = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| self.storage.data_dir.clone());
        StoreConfig { data_dir: PathBuf::from(data_dir), persist_local: self.storage.persist_local }
    }

    /// Validate the configuration settings
    pub fn validate(&self) -> Result<()> {
        let store = self.store_config();
        fs::create_dir_all(&store.data_dir)
            .with_context(|| format!("Cannot create data directory: {:?}", store.data_dir))?;

        if let Some(path) = &self.badge.path {
            if let Some(parent) = Path::new(path).parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create badge directory: {:?}", parent))?;
            }
        }

        if self.resume.poll_seconds == 0 {
            anyhow::bail!("resume.poll_seconds must be at least 1");
        }

        if !self.storage.persist_local {
            warn!("Local partition is not persisted - an active task is lost on restart");
        }

        debug!("Configuration validation passed");
        Ok(())
    }
}

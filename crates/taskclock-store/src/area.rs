use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskclock_common::Entries;
use tokio::sync::broadcast;

use crate::error::{Result, StoreError};

/// The two partitions of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaName {
    /// Propagates across the user's devices.
    Sync,
    /// Confined to this device.
    Local,
}

impl AreaName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for AreaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AreaName {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sync" => Ok(Self::Sync),
            "local" => Ok(Self::Local),
            other => Err(StoreError::UnknownArea(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// One write batch as seen by subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub area: AreaName,
    pub changes: HashMap<String, ValueChange>,
}

/// A single asynchronous key/value partition.
#[async_trait]
pub trait StorageArea: Send + Sync {
    fn name(&self) -> AreaName;

    /// Fetch `keys`; keys with no stored value are left out of the result.
    async fn get(&self, keys: &[&str]) -> Result<Entries>;

    async fn get_all(&self) -> Result<Entries>;

    /// Store every item of the batch, then publish one [`StorageChange`]
    /// listing the keys whose value changed.
    async fn set(&self, items: Entries) -> Result<()>;

    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

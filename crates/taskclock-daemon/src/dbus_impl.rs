use anyhow::{Context, Result};
use serde_json::Value;
use taskclock_common::Entries;
use taskclock_proto::InboundSignal;
use taskclock_store::{AreaName, KeyValueStore};
use tokio::sync::mpsc;
use tracing::warn;
use zbus::interface;

use crate::event_router::RouterCommand;
use crate::hours_aggregator::HoursAggregator;

pub struct CoordinatorService {
    commands: mpsc::Sender<RouterCommand>,
    aggregator: HoursAggregator,
}

impl CoordinatorService {
    pub fn new(commands: mpsc::Sender<RouterCommand>, aggregator: HoursAggregator) -> Self {
        Self { commands, aggregator }
    }

    /// Queue a raw message for the router. Unknown messages are not an error.
    pub async fn deliver(&self, message_json: &str) -> Result<bool> {
        let Some(signal) = InboundSignal::parse(message_json) else {
            return Ok(false);
        };
        self.commands
            .send(RouterCommand::Signal(signal))
            .await
            .map_err(|e| anyhow::anyhow!("Event router is not running: {}", e))?;
        Ok(true)
    }
}

#[interface(name = "org.taskclock.Coordinator")]
impl CoordinatorService {
    async fn send_message(&self, message_json: &str) -> String {
        match self.deliver(message_json).await {
            Ok(true) => "ok".to_string(),
            Ok(false) => "ignored".to_string(),
            Err(e) => {
                warn!("Failed to deliver message: {}", e);
                format!("error:{}", e)
            }
        }
    }

    async fn week_total(&self) -> f64 {
        match self.aggregator.weekly_total().await {
            Ok(minutes) => minutes,
            Err(e) => {
                warn!("Failed to compute weekly total: {}", e);
                -1.0
            }
        }
    }

    #[zbus(signal)]
    async fn update_calendar(
        signal_ctxt: &zbus::SignalContext<'_>,
        time_day: f64,
        time_week: f64,
    ) -> zbus::Result<()>;
}

/// Store access for the settings UI and content scripts.
pub struct StorageService {
    store: KeyValueStore,
}

impl StorageService {
    pub fn new(store: KeyValueStore) -> Self {
        Self { store }
    }

    pub async fn get_entries(&self, area: &str, keys_json: &str) -> Result<String> {
        let area: AreaName = area.parse()?;
        let keys: Vec<String> =
            serde_json::from_str(keys_json).context("Keys must be a JSON array of strings")?;
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();

        let entries = self.store.area(area).get(&key_refs).await?;
        Ok(serde_json::to_string(&entries)?)
    }

    pub async fn set_entries(&self, area: &str, items_json: &str) -> Result<()> {
        let area: AreaName = area.parse()?;
        let items = match serde_json::from_str::<Value>(items_json)
            .context("Items must be a JSON object")?
        {
            Value::Object(map) => map.into_iter().collect::<Entries>(),
            other => anyhow::bail!("Items must be a JSON object, got {}", other),
        };

        self.store.area(area).set(items).await?;
        Ok(())
    }
}

#[interface(name = "org.taskclock.Storage")]
impl StorageService {
    async fn get_items(&self, area: &str, keys_json: &str) -> String {
        match self.get_entries(area, keys_json).await {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to read {} store: {}", area, e);
                serde_json::json!({ "error": e.to_string() }).to_string()
            }
        }
    }

    async fn set_items(&self, area: &str, items_json: &str) -> String {
        match self.set_entries(area, items_json).await {
            Ok(()) => "ok".to_string(),
            Err(e) => {
                warn!("Failed to write {} store: {}", area, e);
                format!("error:{}", e)
            }
        }
    }
}

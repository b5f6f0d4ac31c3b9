use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use taskclock_common::{keys, minutes_from, today_key, Settings, TaskSession};
use taskclock_proto::{InboundSignal, OutboundSignal};
use taskclock_store::{AreaName, KeyValueStore, StorageChange, ValueChange};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

use crate::badge::BadgeDisplay;
use crate::countdown_badge::CountdownBadge;
use crate::hours_aggregator::HoursAggregator;
use crate::notification_manager::Notifier;
use crate::notification_policy::{compose_goal_message, GOAL_NOTIFICATION_TITLE};

const OUTBOUND_CHANNEL_CAPACITY: usize = 32;

/// Work delivered to the router's event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterCommand {
    Signal(InboundSignal),
    /// The host came back from a suspend.
    SystemResumed,
}

/// Dispatches lifecycle messages and store changes to the countdown, the
/// hours aggregator and goal notifications.
pub struct EventRouter {
    store: KeyValueStore,
    aggregator: HoursAggregator,
    countdown: CountdownBadge,
    notifier: Arc<dyn Notifier>,
    outbound: broadcast::Sender<OutboundSignal>,
}

impl EventRouter {
    pub fn new(
        store: KeyValueStore,
        display: Arc<dyn BadgeDisplay>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (outbound, _) = broadcast::channel(OUTBOUND_CHANNEL_CAPACITY);
        Self {
            aggregator: HoursAggregator::new(store.clone()),
            store,
            countdown: CountdownBadge::new(display),
            notifier,
            outbound,
        }
    }

    pub fn subscribe_outbound(&self) -> broadcast::Receiver<OutboundSignal> {
        self.outbound.subscribe()
    }

    pub fn countdown(&self) -> &CountdownBadge {
        &self.countdown
    }

    pub fn aggregator(&self) -> &HoursAggregator {
        &self.aggregator
    }

    /// Process commands and synchronized-partition changes one at a time
    /// until `shutdown` flips or every command sender is gone.
    pub async fn run(
        self,
        mut commands: mpsc::Receiver<RouterCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut changes = self.store.sync().subscribe();
        info!("Event router running");

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if let Err(e) = self.handle_command(command).await {
                        warn!("Failed to handle command: {}", e);
                    }
                }
                change = changes.recv() => match change {
                    Ok(change) => {
                        if let Err(e) = self.handle_storage_change(&change).await {
                            warn!("Failed to handle store change: {}", e);
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Event router missed {} store change events", missed);
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = shutdown.changed() => break,
            }
        }

        self.countdown.clear().await;
        info!("Event router stopped");
    }

    pub async fn handle_command(&self, command: RouterCommand) -> Result<()> {
        match command {
            RouterCommand::Signal(signal) => self.handle_signal(signal).await,
            RouterCommand::SystemResumed => {
                if self.refresh_timer_enabled().await? {
                    self.countdown.restart().await;
                }
                Ok(())
            }
        }
    }

    pub async fn handle_signal(&self, signal: InboundSignal) -> Result<()> {
        debug!("Handling {} message", signal.status());

        match signal {
            InboundSignal::CancelTask => {
                let session = self.aggregator.task_session().await?;
                if !session.active {
                    debug!("Cancel ignored, no active task");
                    return Ok(());
                }
                self.store.local().set(TaskSession::cleared().to_entries()).await?;
                info!("Task {} cancelled", session.id);
            }
            InboundSignal::SubmitTask => {
                let session = self.aggregator.task_session().await?;
                if !session.active {
                    debug!("Submit ignored, no active task");
                    return Ok(());
                }
                self.aggregator.record_completed_task().await?;
            }
            InboundSignal::RefreshTimer { time } => {
                self.countdown.clear().await;
                self.countdown.start(time).await;
            }
        }

        Ok(())
    }

    pub async fn handle_storage_change(&self, change: &StorageChange) -> Result<()> {
        if change.area != AreaName::Sync {
            return Ok(());
        }

        let today = today_key();
        if let Some(day) = change.changes.get(&today) {
            let old_minutes = minutes_from(day.old_value.as_ref());
            let new_minutes = minutes_from(day.new_value.as_ref());
            if new_minutes > old_minutes {
                self.on_daily_total_increased(new_minutes).await?;
            }
        }

        if let Some(setting) = change.changes.get(keys::REFRESH_TIMER) {
            self.on_refresh_timer_setting(setting).await;
        }

        Ok(())
    }

    async fn on_daily_total_increased(&self, day_minutes: f64) -> Result<()> {
        let week_minutes = match self.aggregator.weekly_total().await {
            Ok(total) => total,
            Err(e) => {
                warn!("Could not compute weekly total: {}", e);
                return Ok(());
            }
        };

        // No listeners is fine.
        let _ = self
            .outbound
            .send(OutboundSignal::UpdateCalendar { time_day: day_minutes, time_week: week_minutes });

        let stored = self.store.sync().get(&keys::GOAL_SETTING_KEYS).await?;
        let settings = Settings::from_entries(&stored)?;

        if let Some(body) = compose_goal_message(&settings, day_minutes, week_minutes) {
            info!("Goal notification: {}", body.trim_end());
            self.notifier.notify(GOAL_NOTIFICATION_TITLE, &body).await?;
        }

        Ok(())
    }

    async fn on_refresh_timer_setting(&self, setting: &ValueChange) {
        let was_enabled = setting.old_value.as_ref().and_then(Value::as_bool);
        match setting.new_value.as_ref().and_then(Value::as_bool) {
            Some(true) if was_enabled != Some(true) => {
                info!("Refresh timer enabled");
                self.countdown.restart().await;
            }
            Some(false) => {
                info!("Refresh timer disabled");
                self.countdown.clear().await;
            }
            _ => {}
        }
    }

    async fn refresh_timer_enabled(&self) -> Result<bool> {
        let stored = self.store.sync().get(&[keys::REFRESH_TIMER]).await?;
        Ok(stored
            .get(keys::REFRESH_TIMER)
            .and_then(Value::as_bool)
            .unwrap_or(Settings::default().refresh_timer))
    }
}

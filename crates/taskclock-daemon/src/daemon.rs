use anyhow::{Context, Result};
use std::sync::Arc;
use taskclock_proto::OutboundSignal;
use taskclock_store::KeyValueStore;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{info, warn};
use zbus::ConnectionBuilder;

use crate::badge::badge_from_config;
use crate::bootstrap::{self, InstallReason};
use crate::config::DaemonConfig;
use crate::dbus_impl::{CoordinatorService, StorageService};
use crate::event_router::EventRouter;
use crate::hours_aggregator::HoursAggregator;
use crate::notification_manager::{NotificationManager, Notifier};
use crate::resume_watch::ResumeWatch;

const COMMAND_QUEUE_DEPTH: usize = 64;
const COORDINATOR_INTERFACE: &str = "org.taskclock.Coordinator";

/// Open both partitions, reporting whether the default settings still need writing.
pub async fn open_store(config: &DaemonConfig) -> Result<(KeyValueStore, InstallReason)> {
    info!("Opening key/value store");

    let store_config = config.store_config();
    let store = KeyValueStore::open(&store_config)
        .await
        .with_context(|| format!("Failed to open store in {:?}", store_config.data_dir))?;
    let reason = InstallReason::detect(&store).await?;

    Ok((store, reason))
}

pub async fn run() -> Result<()> {
    info!("Initializing daemon");

    let config = DaemonConfig::load()?;
    config.validate()?;

    let (store, reason) = open_store(&config).await?;
    bootstrap::on_installed(&store, reason).await?;

    let notifier: Arc<dyn Notifier> =
        Arc::new(NotificationManager::new(config.notifications.desktop));
    let router = EventRouter::new(store.clone(), badge_from_config(&config.badge), notifier);
    let outbound = router.subscribe_outbound();

    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let coordinator =
        CoordinatorService::new(commands_tx.clone(), HoursAggregator::new(store.clone()));
    let storage = StorageService::new(store);

    let conn = ConnectionBuilder::session()?
        .name(config.dbus.service_name.as_str())?
        .serve_at(config.dbus.object_path.as_str(), coordinator)?
        .serve_at(config.dbus.object_path.as_str(), storage)?
        .build()
        .await
        .context("Failed to register on the session bus")?;

    info!("DBus service registered at {}", config.dbus.service_name);

    let router_task = tokio::spawn(router.run(commands_rx, shutdown_rx));
    tokio::spawn(forward_outbound(conn.clone(), config.dbus.object_path.clone(), outbound));
    tokio::spawn(ResumeWatch::new(&config.resume).run(commands_tx));

    info!("Daemon running, waiting for shutdown signal...");

    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully...");
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down gracefully...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down gracefully...");
    }

    let _ = shutdown_tx.send(true);
    router_task.await.context("Event router task failed")?;
    drop(conn);

    info!("Daemon shutdown complete");
    Ok(())
}

/// Re-broadcast router output as DBus signals.
async fn forward_outbound(
    conn: zbus::Connection,
    object_path: String,
    mut outbound: broadcast::Receiver<OutboundSignal>,
) {
    loop {
        match outbound.recv().await {
            Ok(OutboundSignal::UpdateCalendar { time_day, time_week }) => {
                if let Err(e) = emit_update_calendar(&conn, &object_path, time_day, time_week).await
                {
                    warn!("Failed to emit UpdateCalendar signal: {}", e);
                }
            }
            Err(RecvError::Lagged(missed)) => {
                warn!("Dropped {} calendar updates", missed);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn emit_update_calendar(
    conn: &zbus::Connection,
    object_path: &str,
    time_day: f64,
    time_week: f64,
) -> Result<()> {
    conn.emit_signal(
        None::<&str>,
        object_path,
        COORDINATOR_INTERFACE,
        "UpdateCalendar",
        &(time_day, time_week),
    )
    .await?;

    info!("Emitted UpdateCalendar signal: day {:.2}, week {:.2}", time_day, time_week);
    Ok(())
}

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use notify_rust::{Notification as SystemNotification, Timeout, Urgency};
use tokio::sync::mpsc;
use tracing::{info, warn};

const NOTIFICATION_TIMEOUT_MS: u32 = 8000;

/// Surface for user-visible notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Shows notifications through the desktop notification server.
pub struct DesktopNotifier;

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        let summary = title.to_string();
        let body = body.to_string();

        // notify-rust talks to the notification server synchronously.
        tokio::task::spawn_blocking(move || {
            let mut desktop_notification = SystemNotification::new();
            desktop_notification
                .summary(&summary)
                .body(&body)
                .icon("appointment-soon")
                .urgency(Urgency::Normal)
                .timeout(Timeout::Milliseconds(NOTIFICATION_TIMEOUT_MS));
            desktop_notification.show().map(|_| ())
        })
        .await??;

        info!("Desktop notification sent: {}", title);
        Ok(())
    }
}

/// Reports notifications through the log only.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        info!("Notification: {} - {}", title, body);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct NotificationRequest {
    title: String,
    body: String,
}

/// Queues notifications to a background task so callers never wait on the
/// notification server.
pub struct NotificationManager {
    sender: mpsc::UnboundedSender<NotificationRequest>,
}

impl NotificationManager {
    /// With `desktop` off, notifications are only logged.
    pub fn new(desktop: bool) -> Self {
        let delivery: Arc<dyn Notifier> =
            if desktop { Arc::new(DesktopNotifier) } else { Arc::new(LogNotifier) };
        Self::with_delivery(delivery)
    }

    pub fn with_delivery(delivery: Arc<dyn Notifier>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<NotificationRequest>();

        tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                if let Err(e) = delivery.notify(&request.title, &request.body).await {
                    warn!("Failed to send notification: {}", e);
                }
            }
        });

        Self { sender }
    }
}

#[async_trait]
impl Notifier for NotificationManager {
    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        self.sender
            .send(NotificationRequest { title: title.to_string(), body: body.to_string() })
            .map_err(|e| anyhow::anyhow!("Failed to queue notification: {}", e))?;
        Ok(())
    }
}

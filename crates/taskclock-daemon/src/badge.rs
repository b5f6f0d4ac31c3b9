use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::BadgeConfig;

/// Where the countdown text is shown. An empty string blanks the badge.
///
/// The countdown calls `set_text` while holding its state lock, so
/// implementations must return without blocking.
pub trait BadgeDisplay: Send + Sync {
    fn set_text(&self, text: &str);
}

/// Badge that only reports through the log.
pub struct LogBadge;

impl BadgeDisplay for LogBadge {
    fn set_text(&self, text: &str) {
        if text.is_empty() {
            debug!("Badge cleared");
        } else {
            debug!("Badge: {}", text);
        }
    }
}

/// Badge mirrored to a small text file so status bars can display it.
///
/// `set_text` only records the text; a background task writes it out, so
/// the countdown never waits on the filesystem. When updates pile up only
/// the newest text is written.
pub struct FileBadge {
    text: watch::Sender<String>,
}

impl FileBadge {
    /// Must be called from within a tokio runtime.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (text, mut updates) = watch::channel(String::new());

        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let current = updates.borrow_and_update().clone();
                if let Err(e) = tokio::fs::write(&path, current).await {
                    warn!("Failed to write badge file {}: {}", path.display(), e);
                }
            }
        });

        Self { text }
    }
}

impl BadgeDisplay for FileBadge {
    fn set_text(&self, text: &str) {
        self.text.send_replace(text.to_string());
    }
}

pub fn badge_from_config(config: &BadgeConfig) -> Arc<dyn BadgeDisplay> {
    match &config.path {
        Some(path) => {
            info!("Badge text will be written to {}", path);
            Arc::new(FileBadge::new(path))
        }
        None => Arc::new(LogBadge),
    }
}

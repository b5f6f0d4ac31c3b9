use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::ResumeConfig;
use crate::event_router::RouterCommand;

/// Notices when the host was suspended by comparing wall-clock progress
/// with the monotonic clock, which stands still while asleep.
pub struct ResumeWatch {
    poll: Duration,
    threshold: Duration,
}

impl ResumeWatch {
    pub fn new(config: &ResumeConfig) -> Self {
        Self {
            poll: Duration::from_secs(config.poll_seconds.max(1)),
            threshold: Duration::from_secs(config.threshold_seconds),
        }
    }

    pub async fn run(self, commands: mpsc::Sender<RouterCommand>) {
        let mut ticks = interval(self.poll);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last_wall = Utc::now();
        let mut last_monotonic = Instant::now();

        loop {
            ticks.tick().await;
            let wall = Utc::now();
            let monotonic = Instant::now();

            if was_suspended(last_wall, wall, monotonic - last_monotonic, self.threshold) {
                info!("System resumed after {} seconds", (wall - last_wall).num_seconds());
                if commands.send(RouterCommand::SystemResumed).await.is_err() {
                    debug!("Event router gone, stopping resume watch");
                    break;
                }
            }

            last_wall = wall;
            last_monotonic = monotonic;
        }
    }
}

fn was_suspended(
    last_wall: DateTime<Utc>,
    wall: DateTime<Utc>,
    monotonic_elapsed: Duration,
    threshold: Duration,
) -> bool {
    let wall_elapsed = (wall - last_wall).to_std().unwrap_or_default();
    wall_elapsed > monotonic_elapsed + threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_regular_poll_is_not_a_suspend() {
        let before = Utc::now();
        let after = before + ChronoDuration::milliseconds(5_020);
        assert!(!was_suspended(before, after, Duration::from_secs(5), Duration::from_secs(10)));
    }

    #[test]
    fn test_wall_clock_jump_is_a_suspend() {
        let before = Utc::now();
        let after = before + ChronoDuration::minutes(40);
        assert!(was_suspended(before, after, Duration::from_secs(5), Duration::from_secs(10)));
    }

    #[test]
    fn test_wall_clock_going_backwards_is_ignored() {
        let before = Utc::now();
        let after = before - ChronoDuration::minutes(5);
        assert!(!was_suspended(before, after, Duration::from_secs(5), Duration::from_secs(10)));
    }
}

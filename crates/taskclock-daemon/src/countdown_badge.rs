use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::badge::BadgeDisplay;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    Idle,
    Running,
    Expired,
}

struct CountdownState {
    phase: CountdownPhase,
    remaining: i64,
    initial_seconds: i64,
    started_at: Option<DateTime<Utc>>,
    ticker: Option<JoinHandle<()>>,
}

impl CountdownState {
    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

/// Refresh countdown rendered on the badge, one decrement per second.
pub struct CountdownBadge {
    state: Arc<Mutex<CountdownState>>,
    display: Arc<dyn BadgeDisplay>,
}

impl CountdownBadge {
    pub fn new(display: Arc<dyn BadgeDisplay>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CountdownState {
                phase: CountdownPhase::Idle,
                remaining: 0,
                initial_seconds: 0,
                started_at: None,
                ticker: None,
            })),
            display,
        }
    }

    pub async fn phase(&self) -> CountdownPhase {
        self.state.lock().await.phase
    }

    pub async fn remaining(&self) -> i64 {
        self.state.lock().await.remaining
    }

    pub async fn start(&self, seconds: i64) {
        self.start_at(seconds, Utc::now()).await
    }

    /// Begin counting down from `seconds`. The first tick lands one second
    /// after the call. A ticker left over from an earlier start is cancelled.
    pub async fn start_at(&self, seconds: i64, now: DateTime<Utc>) {
        let mut state = self.state.lock().await;
        state.cancel_ticker();
        state.phase = CountdownPhase::Running;
        state.remaining = seconds;
        state.initial_seconds = seconds;
        state.started_at = Some(now);
        state.ticker = Some(self.spawn_ticker());

        info!("Refresh countdown started at {} seconds", seconds);
    }

    pub async fn restart(&self) {
        self.restart_at(Utc::now()).await
    }

    /// Recompute the countdown from wall-clock time after the process was
    /// suspended, then resume ticking if any time is left.
    pub async fn restart_at(&self, now: DateTime<Utc>) {
        let mut state = self.state.lock().await;
        let Some(started_at) = state.started_at else {
            debug!("No countdown to restart");
            return;
        };
        if state.remaining <= 0 {
            debug!("Countdown already finished, nothing to restart");
            return;
        }

        state.cancel_ticker();

        let elapsed_seconds = (now - started_at).num_milliseconds().max(0) / 1000;
        let remaining = state.initial_seconds - elapsed_seconds;
        if remaining <= 0 {
            state.phase = CountdownPhase::Expired;
            state.remaining = remaining;
            self.display.set_text("");
            info!("Countdown ran out while suspended ({} seconds over)", -remaining);
            return;
        }

        self.display.set_text(&remaining.to_string());
        state.phase = CountdownPhase::Running;
        state.remaining = remaining - 1;
        state.ticker = Some(self.spawn_ticker());

        info!("Refresh countdown resumed with {} seconds left", remaining);
    }

    /// Cancel the ticker and blank the badge. The start record is kept so a
    /// later `restart` can pick the countdown back up.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.cancel_ticker();
        if state.phase == CountdownPhase::Running {
            state.phase = CountdownPhase::Idle;
        }
        self.display.set_text("");
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let display = Arc::clone(&self.display);

        tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + TICK, TICK);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticks.tick().await;

                let mut state = state.lock().await;
                if state.remaining <= 0 {
                    state.phase = CountdownPhase::Expired;
                    // Dropping our own handle detaches it; the loop ends below.
                    state.ticker = None;
                    display.set_text("");
                    info!("Refresh countdown expired");
                    break;
                }

                display.set_text(&state.remaining.to_string());
                state.remaining -= 1;
            }
        })
    }
}

impl Drop for CountdownBadge {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_lock() {
            state.cancel_ticker();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use std::sync::Mutex as StdMutex;
    use tokio::time::sleep;

    #[derive(Default)]
    struct RecordingBadge {
        texts: StdMutex<Vec<String>>,
    }

    impl RecordingBadge {
        fn texts(&self) -> Vec<String> {
            self.texts.lock().unwrap().clone()
        }
    }

    impl BadgeDisplay for RecordingBadge {
        fn set_text(&self, text: &str) {
            self.texts.lock().unwrap().push(text.to_string());
        }
    }

    fn badge() -> (Arc<RecordingBadge>, CountdownBadge) {
        let display = Arc::new(RecordingBadge::default());
        let countdown = CountdownBadge::new(display.clone());
        (display, countdown)
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_ticks_down_then_clears() {
        let (display, countdown) = badge();
        countdown.start(3).await;
        assert!(display.texts().is_empty());

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(display.texts(), vec!["3"]);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(display.texts(), vec!["3", "2", "1"]);
        assert_eq!(countdown.phase().await, CountdownPhase::Running);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(display.texts(), vec!["3", "2", "1", ""]);
        assert_eq!(countdown.phase().await, CountdownPhase::Expired);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(display.texts().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_stops_ticking() {
        let (display, countdown) = badge();
        countdown.start(10).await;

        sleep(Duration::from_millis(2500)).await;
        countdown.clear().await;
        sleep(Duration::from_secs(5)).await;

        assert_eq!(display.texts(), vec!["10", "9", ""]);
        assert_eq!(countdown.phase().await, CountdownPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_twice_is_harmless() {
        let (display, countdown) = badge();
        countdown.clear().await;
        countdown.clear().await;

        assert_eq!(display.texts(), vec!["", ""]);
        assert_eq!(countdown.phase().await, CountdownPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_long_suspend_stays_cleared() {
        let (display, countdown) = badge();
        let started = Utc::now();
        countdown.start_at(10, started).await;
        countdown.clear().await;

        countdown.restart_at(started + ChronoDuration::seconds(12)).await;
        sleep(Duration::from_secs(3)).await;

        assert_eq!(display.texts(), vec!["", ""]);
        assert_eq!(countdown.phase().await, CountdownPhase::Expired);
        assert_eq!(countdown.remaining().await, -2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_renders_immediately_and_resumes() {
        let (display, countdown) = badge();
        let started = Utc::now();
        countdown.start_at(60, started).await;
        countdown.clear().await;

        countdown.restart_at(started + ChronoDuration::milliseconds(57_900)).await;
        assert_eq!(display.texts(), vec!["", "3"]);

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(display.texts(), vec!["", "3", "2"]);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(display.texts(), vec!["", "3", "2", "1", ""]);
        assert_eq!(countdown.phase().await, CountdownPhase::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_without_countdown_is_noop() {
        let (display, countdown) = badge();
        countdown.restart().await;

        assert!(display.texts().is_empty());
        assert_eq!(countdown.phase().await, CountdownPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_expiry_is_noop() {
        let (display, countdown) = badge();
        countdown.start(1).await;
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(display.texts(), vec!["1", ""]);

        countdown.restart().await;
        assert_eq!(display.texts(), vec!["1", ""]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_replaces_running_countdown() {
        let (display, countdown) = badge();
        countdown.start(100).await;
        sleep(Duration::from_millis(1500)).await;

        countdown.start(2).await;
        sleep(Duration::from_secs(4)).await;

        assert_eq!(display.texts(), vec!["100", "2", "1", ""]);
    }
}

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate};
use serde_json::Value;
use taskclock_common::{
    date_key, date_key_for, keys, minutes_from, week_keys, Result, TaskSession,
};
use taskclock_store::KeyValueStore;
use tracing::{debug, info, warn};

/// Outcome of crediting a finished task to the day's total.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditedTask {
    pub date_key: String,
    pub elapsed_minutes: f64,
    pub credited_minutes: f64,
    pub previous_total: f64,
    pub new_total: f64,
}

/// Reads and accumulates worked minutes in the synchronized partition.
#[derive(Clone)]
pub struct HoursAggregator {
    store: KeyValueStore,
}

impl HoursAggregator {
    pub fn new(store: KeyValueStore) -> Self {
        Self { store }
    }

    pub async fn task_session(&self) -> Result<TaskSession> {
        let entries = self.store.local().get(&keys::TASK_SESSION_KEYS).await?;
        Ok(TaskSession::from_entries(&entries))
    }

    pub async fn record_completed_task(&self) -> Result<CreditedTask> {
        self.record_completed_task_at(Local::now()).await
    }

    /// Credit the active task to the day containing `now`, capped at the
    /// task's allotted minutes, and mark the session inactive.
    ///
    /// The daily total is read, increased and written back without any
    /// compare-and-swap; callers serialize submissions.
    pub async fn record_completed_task_at(&self, now: DateTime<Local>) -> Result<CreditedTask> {
        let session = self.task_session().await?;
        let started_at = session.started_at()?;
        let ceiling = session.ceiling_minutes()?;

        let day_key = date_key_for(&now);
        let stored = self.store.sync().get(&[day_key.as_str()]).await?;
        let previous_total = minutes_from(stored.get(&day_key));

        let elapsed_minutes = (now - started_at).num_milliseconds() as f64 / 60_000.0;
        // A start time in the future would otherwise shrink the total.
        let credited_minutes = elapsed_minutes.min(ceiling).max(0.0);
        let new_total = previous_total + credited_minutes;

        self.store.sync().set(HashMap::from([(day_key.clone(), Value::from(new_total))])).await?;
        let deactivated = self
            .store
            .local()
            .set(HashMap::from([(keys::TASK_ACTIVE.to_string(), Value::Bool(false))]))
            .await;
        if let Err(e) = deactivated {
            // Undo the credit while the session is still active.
            let previous = stored.get(&day_key).cloned().unwrap_or_else(|| Value::from(0.0));
            if let Err(rollback) =
                self.store.sync().set(HashMap::from([(day_key.clone(), previous)])).await
            {
                warn!("Failed to roll back {} after a failed submission: {}", day_key, rollback);
            }
            return Err(e.into());
        }

        info!(
            "Credited {:.2} of {:.2} elapsed minutes to {} (total {:.2})",
            credited_minutes, elapsed_minutes, day_key, new_total
        );

        Ok(CreditedTask {
            date_key: day_key,
            elapsed_minutes,
            credited_minutes,
            previous_total,
            new_total,
        })
    }

    pub async fn daily_total(&self, date: NaiveDate) -> Result<f64> {
        let key = date_key(date);
        let stored = self.store.sync().get(&[key.as_str()]).await?;
        Ok(minutes_from(stored.get(&key)))
    }

    pub async fn weekly_total(&self) -> Result<f64> {
        self.weekly_total_for(Local::now().date_naive()).await
    }

    /// Sum of the seven daily totals of the Sunday-start week containing
    /// `date`. Only a failed read is an error; missing days count as zero.
    pub async fn weekly_total_for(&self, date: NaiveDate) -> Result<f64> {
        let week = week_keys(date);
        let key_refs: Vec<&str> = week.iter().map(String::as_str).collect();
        let stored = self.store.sync().get(&key_refs).await?;

        let total = week.iter().map(|key| minutes_from(stored.get(key))).sum();
        debug!("Week of {} totals {:.2} minutes", week[0], total);
        Ok(total)
    }
}

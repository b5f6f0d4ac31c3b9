use std::collections::HashMap;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::keys;

/// Flat key/value pairs as read from or written to a store partition.
pub type Entries = HashMap<String, Value>;

/// Minutes recorded under a date key. Absent, non-numeric and non-finite
/// values all count as zero.
pub fn minutes_from(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).filter(|minutes| minutes.is_finite()).unwrap_or(0.0)
}

/// The in-progress timed task, kept in the local partition.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSession {
    pub active: bool,
    /// Task identifier as sent by the content script; `-1` when cleared.
    pub id: Value,
    /// Start time in milliseconds since the Unix epoch.
    pub timestamp: Option<i64>,
    /// Allotted minutes ceiling for this task.
    pub time: f64,
}

impl TaskSession {
    pub fn begin(id: Value, minutes: f64, now: DateTime<Local>) -> Self {
        Self { active: true, id, timestamp: Some(now.timestamp_millis()), time: minutes }
    }

    /// The state written when a task is cancelled.
    pub fn cleared() -> Self {
        Self { active: false, id: Value::from(-1), timestamp: None, time: 0.0 }
    }

    pub fn from_entries(entries: &Entries) -> Self {
        let cleared = Self::cleared();
        Self {
            active: entries.get(keys::TASK_ACTIVE).and_then(Value::as_bool).unwrap_or(false),
            id: entries.get(keys::TASK_ID).cloned().unwrap_or(cleared.id),
            timestamp: entries.get(keys::TASK_TIMESTAMP).and_then(|value| {
                value.as_i64().or_else(|| value.as_f64().map(|ms| ms as i64))
            }),
            time: entries.get(keys::TASK_TIME).and_then(Value::as_f64).unwrap_or(cleared.time),
        }
    }

    pub fn to_entries(&self) -> Entries {
        let mut entries = Entries::new();
        entries.insert(keys::TASK_ACTIVE.to_string(), Value::Bool(self.active));
        entries.insert(keys::TASK_ID.to_string(), self.id.clone());
        entries.insert(
            keys::TASK_TIMESTAMP.to_string(),
            self.timestamp.map(Value::from).unwrap_or(Value::Null),
        );
        entries.insert(keys::TASK_TIME.to_string(), Value::from(self.time));
        entries
    }

    pub fn started_at(&self) -> Result<DateTime<Local>> {
        let millis = self
            .timestamp
            .ok_or_else(|| Error::InvalidSession("task has no start timestamp".to_string()))?;
        Local
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| Error::InvalidSession(format!("start timestamp {} is out of range", millis)))
    }

    /// The allotted minutes, rejecting values that cannot cap a duration.
    pub fn ceiling_minutes(&self) -> Result<f64> {
        if self.time.is_finite() && self.time >= 0.0 {
            Ok(self.time)
        } else {
            Err(Error::InvalidSession(format!("allotted minutes {} is not usable", self.time)))
        }
    }
}

impl Default for TaskSession {
    fn default() -> Self {
        Self::cleared()
    }
}

/// User settings kept in the synchronized partition.
///
/// Field names map onto the literal keys in [`crate::keys`]. `Default` holds
/// the values written on first install.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "minTime")]
    pub min_time: f64,
    #[serde(rename = "maxTime")]
    pub max_time: f64,
    #[serde(rename = "refreshSetting")]
    pub refresh: bool,
    #[serde(rename = "refreshSoundSetting")]
    pub refresh_sound: bool,
    #[serde(rename = "refreshSoundVolumeSetting")]
    pub refresh_sound_volume: f64,
    #[serde(rename = "refreshTimerSetting")]
    pub refresh_timer: bool,
    #[serde(rename = "timeoutSoundSetting")]
    pub timeout_sound: bool,
    #[serde(rename = "timeoutSoundVolumeSetting")]
    pub timeout_sound_volume: f64,
    #[serde(rename = "dailyHourDisplaySetting")]
    pub daily_hour_display: bool,
    #[serde(rename = "weeklyHourDisplaySetting")]
    pub weekly_hour_display: bool,
    #[serde(rename = "taskWebsiteSetting")]
    pub task_website: bool,
    #[serde(rename = "taskWebsiteURLSetting")]
    pub task_website_url: String,
    #[serde(rename = "employeeWebsiteSetting")]
    pub employee_website: bool,
    #[serde(rename = "employeeWebsiteURLSetting")]
    pub employee_website_url: String,
    #[serde(rename = "timesheetWebsiteSetting")]
    pub timesheet_website: bool,
    #[serde(rename = "timesheetWebsiteURLSetting")]
    pub timesheet_website_url: String,
    #[serde(rename = "dynamicGoalsSetting")]
    pub dynamic_goals: bool,
    #[serde(rename = "dailyHourGoal")]
    pub daily_hour_goal: f64,
    #[serde(rename = "weeklyHourGoal")]
    pub weekly_hour_goal: f64,
    #[serde(rename = "goalNotificationsSetting")]
    pub goal_notifications: bool,
    #[serde(rename = "beforeGoalNotificationsSetting")]
    pub before_goal_notifications: bool,
    #[serde(rename = "notificationMinutes")]
    pub notification_minutes: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_time: 30.0,
            max_time: 60.0,
            refresh: true,
            refresh_sound: true,
            refresh_sound_volume: 100.0,
            refresh_timer: true,
            timeout_sound: true,
            timeout_sound_volume: 100.0,
            daily_hour_display: true,
            weekly_hour_display: true,
            task_website: false,
            task_website_url: String::new(),
            employee_website: false,
            employee_website_url: String::new(),
            timesheet_website: false,
            timesheet_website_url: String::new(),
            dynamic_goals: false,
            daily_hour_goal: 8.0,
            weekly_hour_goal: 20.0,
            goal_notifications: true,
            before_goal_notifications: true,
            notification_minutes: 15.0,
        }
    }
}

impl Settings {
    pub fn to_entries(&self) -> Result<Entries> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(Error::Store(format!("settings serialized to non-object: {}", other))),
        }
    }

    /// Build settings from stored entries. Keys that are absent or hold a
    /// value of the wrong type keep their install default.
    pub fn from_entries(entries: &Entries) -> Result<Self> {
        let mut merged = Self::default().to_entries()?;
        for (key, default_value) in merged.iter_mut() {
            if let Some(stored) = entries.get(key) {
                if std::mem::discriminant(stored) == std::mem::discriminant(default_value) {
                    *default_value = stored.clone();
                } else {
                    tracing::debug!("Ignoring mistyped setting {}: {}", key, stored);
                }
            }
        }
        Ok(serde_json::from_value(Value::Object(merged.into_iter().collect()))?)
    }
}

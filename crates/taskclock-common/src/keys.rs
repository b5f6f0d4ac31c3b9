//! Fixed key names used in the two store partitions.
//!
//! Daily minute totals are keyed by [`crate::date_key`] instead and do not
//! appear here.

// Local partition: the in-progress task session.
pub const TASK_ACTIVE: &str = "taskActive";
pub const TASK_ID: &str = "taskID";
pub const TASK_TIMESTAMP: &str = "taskTimestamp";
pub const TASK_TIME: &str = "taskTime";

pub const TASK_SESSION_KEYS: [&str; 4] = [TASK_ACTIVE, TASK_ID, TASK_TIMESTAMP, TASK_TIME];

// Synchronized partition: settings written at install and edited by the settings UI.
pub const MIN_TIME: &str = "minTime";
pub const MAX_TIME: &str = "maxTime";
pub const REFRESH: &str = "refreshSetting";
pub const REFRESH_SOUND: &str = "refreshSoundSetting";
pub const REFRESH_SOUND_VOLUME: &str = "refreshSoundVolumeSetting";
pub const REFRESH_TIMER: &str = "refreshTimerSetting";
pub const TIMEOUT_SOUND: &str = "timeoutSoundSetting";
pub const TIMEOUT_SOUND_VOLUME: &str = "timeoutSoundVolumeSetting";
pub const DAILY_HOUR_DISPLAY: &str = "dailyHourDisplaySetting";
pub const WEEKLY_HOUR_DISPLAY: &str = "weeklyHourDisplaySetting";
pub const TASK_WEBSITE: &str = "taskWebsiteSetting";
pub const TASK_WEBSITE_URL: &str = "taskWebsiteURLSetting";
pub const EMPLOYEE_WEBSITE: &str = "employeeWebsiteSetting";
pub const EMPLOYEE_WEBSITE_URL: &str = "employeeWebsiteURLSetting";
pub const TIMESHEET_WEBSITE: &str = "timesheetWebsiteSetting";
pub const TIMESHEET_WEBSITE_URL: &str = "timesheetWebsiteURLSetting";
pub const DYNAMIC_GOALS: &str = "dynamicGoalsSetting";
pub const DAILY_HOUR_GOAL: &str = "dailyHourGoal";
pub const WEEKLY_HOUR_GOAL: &str = "weeklyHourGoal";
pub const GOAL_NOTIFICATIONS: &str = "goalNotificationsSetting";
pub const BEFORE_GOAL_NOTIFICATIONS: &str = "beforeGoalNotificationsSetting";
pub const NOTIFICATION_MINUTES: &str = "notificationMinutes";

/// Settings consulted when evaluating goal notifications.
pub const GOAL_SETTING_KEYS: [&str; 5] = [
    DAILY_HOUR_GOAL,
    WEEKLY_HOUR_GOAL,
    GOAL_NOTIFICATIONS,
    BEFORE_GOAL_NOTIFICATIONS,
    NOTIFICATION_MINUTES,
];

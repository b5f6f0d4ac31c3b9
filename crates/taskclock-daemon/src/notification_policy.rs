use std::fmt;

use taskclock_common::Settings;

pub const GOAL_NOTIFICATION_TITLE: &str = "Gooooooooal!!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Daily,
    Weekly,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => f.write_str("daily"),
            Self::Weekly => f.write_str("weekly"),
        }
    }
}

/// Decide whether `minutes_worked` warrants an "approaching" or "achieved"
/// goal message for `period`.
pub fn evaluate(
    period: Period,
    goal_hours: f64,
    minutes_worked: f64,
    before_goal_enabled: bool,
    achieved_goal_enabled: bool,
    threshold_minutes: f64,
) -> Option<String> {
    let goal_minutes = goal_hours * 60.0;

    if minutes_worked < goal_minutes {
        let remaining = goal_minutes - minutes_worked;
        if before_goal_enabled && remaining <= threshold_minutes {
            return Some(format!(
                "You are {:.2} minutes away from your {} goal! ",
                remaining, period
            ));
        }
        None
    } else if achieved_goal_enabled {
        Some(format!("You have reached your {} goal of {} hours! ", period, goal_hours))
    } else {
        None
    }
}

/// Daily then weekly message, or `None` when neither fires.
pub fn compose_goal_message(
    settings: &Settings,
    day_minutes: f64,
    week_minutes: f64,
) -> Option<String> {
    let daily = evaluate(
        Period::Daily,
        settings.daily_hour_goal,
        day_minutes,
        settings.before_goal_notifications,
        settings.goal_notifications,
        settings.notification_minutes,
    );
    let weekly = evaluate(
        Period::Weekly,
        settings.weekly_hour_goal,
        week_minutes,
        settings.before_goal_notifications,
        settings.goal_notifications,
        settings.notification_minutes,
    );

    let body: String = [daily, weekly].into_iter().flatten().collect();
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Messages sent to the coordinator by content scripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum InboundSignal {
    CancelTask,
    SubmitTask,
    /// Restart the badge countdown at `time` seconds.
    RefreshTimer { time: i64 },
}

impl InboundSignal {
    /// Parse a message, returning `None` for unknown statuses or malformed payloads.
    pub fn parse(message: &str) -> Option<Self> {
        match serde_json::from_str(message) {
            Ok(signal) => Some(signal),
            Err(e) => {
                debug!("Ignoring unrecognized message {}: {}", message, e);
                None
            }
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::CancelTask => "cancel-task",
            Self::SubmitTask => "submit-task",
            Self::RefreshTimer { .. } => "refresh-timer",
        }
    }
}

/// Messages broadcast by the coordinator to every listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum OutboundSignal {
    #[serde(rename_all = "camelCase")]
    UpdateCalendar { time_day: f64, time_week: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_lifecycle_messages() {
        assert_eq!(InboundSignal::parse(r#"{"status":"cancel-task"}"#), Some(InboundSignal::CancelTask));
        assert_eq!(InboundSignal::parse(r#"{"status":"submit-task"}"#), Some(InboundSignal::SubmitTask));
    }

    #[test]
    fn test_parse_refresh_timer_with_payload() {
        let signal = InboundSignal::parse(r#"{"status":"refresh-timer","time":1800}"#);
        assert_eq!(signal, Some(InboundSignal::RefreshTimer { time: 1800 }));
        assert_eq!(signal.unwrap().status(), "refresh-timer");
    }

    #[test]
    fn test_extra_payload_fields_are_tolerated() {
        let signal = InboundSignal::parse(r#"{"status":"submit-task","taskID":17}"#);
        assert_eq!(signal, Some(InboundSignal::SubmitTask));
    }

    #[test]
    fn test_unknown_or_malformed_messages_are_ignored() {
        assert_eq!(InboundSignal::parse(r#"{"status":"open-settings"}"#), None);
        assert_eq!(InboundSignal::parse(r#"{"status":"refresh-timer"}"#), None);
        assert_eq!(InboundSignal::parse(r#"{"status":"refresh-timer","time":"soon"}"#), None);
        assert_eq!(InboundSignal::parse(r#"{"time":30}"#), None);
        assert_eq!(InboundSignal::parse("not json"), None);
    }

    #[test]
    fn test_update_calendar_wire_shape() {
        let signal = OutboundSignal::UpdateCalendar { time_day: 90.5, time_week: 300.0 };
        let value = serde_json::to_value(&signal).unwrap();
        assert_eq!(value, json!({"status": "update-calendar", "timeDay": 90.5, "timeWeek": 300.0}));
    }
}

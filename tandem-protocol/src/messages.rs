//! Events broadcast to message sinks

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Why a poller stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Stopped by `stop_polling`, `stop_all_polling` or a restart for the same key
    Cancelled,
    /// Reached the absolute polling ceiling
    TimedOut,
    /// A prompt was committed; further input must come from a human
    AwaitingUser,
}

/// Event pushed to the message sink
///
/// Delivery is fire-and-forget; sinks may drop events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A message was persisted
    MessageCreated { message: Message },
    /// Partial reply text while the tool is still working
    ResponseProgress { key: SessionKey, content: String },
    /// Classified status changed since the previous poll
    StatusChanged {
        key: SessionKey,
        status: StatusDetectionResult,
    },
    /// Pending prompts were resolved directly in the terminal
    PromptsAnswered { key: SessionKey, count: usize },
    /// Poller for a session stopped
    PollerStopped { key: SessionKey, reason: StopReason },
}

impl MonitorEvent {
    /// Session the event belongs to
    pub fn key(&self) -> SessionKey {
        match self {
            MonitorEvent::MessageCreated { message } => message.key(),
            MonitorEvent::ResponseProgress { key, .. }
            | MonitorEvent::StatusChanged { key, .. }
            | MonitorEvent::PromptsAnswered { key, .. }
            | MonitorEvent::PollerStopped { key, .. } => key.clone(),
        }
    }

    /// Event type name as serialized in the `event` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            MonitorEvent::MessageCreated { .. } => "message_created",
            MonitorEvent::ResponseProgress { .. } => "response_progress",
            MonitorEvent::StatusChanged { .. } => "status_changed",
            MonitorEvent::PromptsAnswered { .. } => "prompts_answered",
            MonitorEvent::PollerStopped { .. } => "poller_stopped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tag_matches_event_type() {
        let key = SessionKey::new("ws", ToolId::Codex);
        let events = vec![
            MonitorEvent::ResponseProgress {
                key: key.clone(),
                content: "partial".into(),
            },
            MonitorEvent::StatusChanged {
                key: key.clone(),
                status: StatusDetectionResult::idle(),
            },
            MonitorEvent::PromptsAnswered {
                key: key.clone(),
                count: 2,
            },
            MonitorEvent::PollerStopped {
                key: key.clone(),
                reason: StopReason::TimedOut,
            },
            MonitorEvent::MessageCreated {
                message: Message::from_new(NewMessage::assistant(key.clone(), "hi")),
            },
        ];

        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["event"], event.event_type());
            assert_eq!(event.key(), key);
        }
    }

    #[test]
    fn test_stop_reason_snake_case() {
        let json = serde_json::to_string(&StopReason::AwaitingUser).unwrap();
        assert_eq!(json, "\"awaiting_user\"");
    }
}

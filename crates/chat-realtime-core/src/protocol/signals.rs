//! Low-level events raised by the signaling transport.
//!
//! The transport speaks its own vocabulary of five event names.  These are
//! never exposed to applications directly; the event router subscribes to
//! each of them once and republishes translated [`NotificationEvent`]s.
//!
//! # Serde representation
//!
//! A raw event is an object with an `"event"` discriminant (the wire name)
//! and a `"data"` field carrying the payload:
//!
//! ```json
//! {"event":"connectionChanged","data":"Connected"}
//! {"event":"participantsAdded","data":{"threadId":"19:t","participantsAdded":[{"id":"u1"}]}}
//! ```
//!
//! [`NotificationEvent`]: crate::domain::events::NotificationEvent

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::connection::ConnectionState;
use crate::domain::events::{
    ChatMessageReceivedEvent, ChatThreadPropertiesUpdatedEvent, ParticipantsAddedEvent,
    ParticipantsRemovedEvent,
};

/// The five event names a signaling transport can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportEventName {
    ConnectionChanged,
    ChatMessageReceived,
    ChatThreadPropertiesUpdated,
    ParticipantsAdded,
    ParticipantsRemoved,
}

impl TransportEventName {
    /// Every transport event name.  The router registers one handler for each.
    pub const ALL: [TransportEventName; 5] = [
        TransportEventName::ConnectionChanged,
        TransportEventName::ChatMessageReceived,
        TransportEventName::ChatThreadPropertiesUpdated,
        TransportEventName::ParticipantsAdded,
        TransportEventName::ParticipantsRemoved,
    ];

    /// The wire name of the event.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportEventName::ConnectionChanged => "connectionChanged",
            TransportEventName::ChatMessageReceived => "chatMessageReceived",
            TransportEventName::ChatThreadPropertiesUpdated => "chatThreadPropertiesUpdated",
            TransportEventName::ParticipantsAdded => "participantsAdded",
            TransportEventName::ParticipantsRemoved => "participantsRemoved",
        }
    }
}

impl fmt::Display for TransportEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw event as raised by the signaling transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum TransportEvent {
    ConnectionChanged(ConnectionState),
    ChatMessageReceived(ChatMessageReceivedEvent),
    ChatThreadPropertiesUpdated(ChatThreadPropertiesUpdatedEvent),
    ParticipantsAdded(ParticipantsAddedEvent),
    ParticipantsRemoved(ParticipantsRemovedEvent),
}

impl TransportEvent {
    /// The name under which this event is raised.
    pub fn name(&self) -> TransportEventName {
        match self {
            TransportEvent::ConnectionChanged(_) => TransportEventName::ConnectionChanged,
            TransportEvent::ChatMessageReceived(_) => TransportEventName::ChatMessageReceived,
            TransportEvent::ChatThreadPropertiesUpdated(_) => {
                TransportEventName::ChatThreadPropertiesUpdated
            }
            TransportEvent::ParticipantsAdded(_) => TransportEventName::ParticipantsAdded,
            TransportEvent::ParticipantsRemoved(_) => TransportEventName::ParticipantsRemoved,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_name_matches_as_str_for_every_event_name() {
        for name in TransportEventName::ALL {
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, format!("\"{}\"", name.as_str()));
        }
    }

    #[test]
    fn test_connection_changed_parses_from_tagged_json() {
        // Arrange
        let json = r#"{"event":"connectionChanged","data":"Disconnected"}"#;

        // Act
        let event: TransportEvent = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(
            event,
            TransportEvent::ConnectionChanged(ConnectionState::Disconnected)
        );
        assert_eq!(event.name(), TransportEventName::ConnectionChanged);
    }

    #[test]
    fn test_participants_added_parses_with_only_ids() {
        let json = r#"{"event":"participantsAdded","data":{"threadId":"19:t","participantsAdded":[{"id":"u1"}]}}"#;

        let event: TransportEvent = serde_json::from_str(json).unwrap();

        match event {
            TransportEvent::ParticipantsAdded(payload) => {
                assert_eq!(payload.participant_ids(), vec!["u1"]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_name_is_rejected() {
        let json = r#"{"event":"typingIndicatorReceived","data":{}}"#;
        assert!(serde_json::from_str::<TransportEvent>(json).is_err());
    }
}

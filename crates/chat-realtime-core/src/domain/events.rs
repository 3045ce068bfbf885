//! Public event kinds and their payloads.
//!
//! # The closed event set
//!
//! Applications can subscribe to exactly six event kinds:
//!
//! | Kind                               | Payload                               | Category         |
//! |------------------------------------|---------------------------------------|------------------|
//! | `chatMessageReceived`              | [`ChatMessageReceivedEvent`]          | domain event     |
//! | `chatThreadPropertiesUpdated`      | [`ChatThreadPropertiesUpdatedEvent`]  | domain event     |
//! | `participantsAdded`                | [`ParticipantsAddedEvent`]            | domain event     |
//! | `participantsRemoved`              | [`ParticipantsRemovedEvent`]          | domain event     |
//! | `realTimeNotificationConnected`    | [`RealTimeNotificationConnected`]     | lifecycle signal |
//! | `realTimeNotificationDisconnected` | [`RealTimeNotificationDisconnected`]  | lifecycle signal |
//!
//! # Matching payloads to tags
//!
//! Every payload type implements [`EventPayload`], whose associated constant
//! `KIND` names the tag it belongs to.  A subscription API that is generic over
//! `E: EventPayload` therefore cannot register a `ParticipantsAddedEvent`
//! listener under `chatMessageReceived`: the compiler picks the tag.
//!
//! All payloads are immutable value records.  They derive `Clone` so a
//! listener that wants to keep one can take its own copy.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Event kinds ───────────────────────────────────────────────────────────────

/// The fixed, closed set of public event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    ChatMessageReceived,
    ChatThreadPropertiesUpdated,
    ParticipantsAdded,
    ParticipantsRemoved,
    RealTimeNotificationConnected,
    RealTimeNotificationDisconnected,
}

impl EventKind {
    /// Every event kind, domain events first.
    pub const ALL: [EventKind; 6] = [
        EventKind::ChatMessageReceived,
        EventKind::ChatThreadPropertiesUpdated,
        EventKind::ParticipantsAdded,
        EventKind::ParticipantsRemoved,
        EventKind::RealTimeNotificationConnected,
        EventKind::RealTimeNotificationDisconnected,
    ];

    /// The public event name, as applications know it.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ChatMessageReceived => "chatMessageReceived",
            EventKind::ChatThreadPropertiesUpdated => "chatThreadPropertiesUpdated",
            EventKind::ParticipantsAdded => "participantsAdded",
            EventKind::ParticipantsRemoved => "participantsRemoved",
            EventKind::RealTimeNotificationConnected => "realTimeNotificationConnected",
            EventKind::RealTimeNotificationDisconnected => "realTimeNotificationDisconnected",
        }
    }

    /// Returns `true` for the two zero-payload connection lifecycle signals.
    ///
    /// Lifecycle signals may be subscribed to before notifications are
    /// started; domain events may not.
    pub fn is_lifecycle_signal(self) -> bool {
        matches!(
            self,
            EventKind::RealTimeNotificationConnected | EventKind::RealTimeNotificationDisconnected
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a string that is not one of the six event names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event kind: {0}")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

// ── Payload records ───────────────────────────────────────────────────────────

/// A participant of a chat thread.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatParticipant {
    /// Communication identifier of the participant.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// ISO 8601 time from which the participant can see thread history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_history_time: Option<String>,
}

impl ChatParticipant {
    /// Creates a participant with only an identifier.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A new message was posted to a thread the user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageReceivedEvent {
    pub thread_id: String,
    /// Identifier of the message.
    pub id: String,
    pub sender: ChatParticipant,
    pub recipient: ChatParticipant,
    /// Message body.
    pub message: String,
    /// Message type, e.g. `"text"` or `"html"`.
    #[serde(rename = "type", default)]
    pub message_type: String,
    /// ISO 8601 creation time.
    pub created_on: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Mutable thread properties carried by [`ChatThreadPropertiesUpdatedEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatThreadProperties {
    pub topic: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// The topic or metadata of a thread changed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatThreadPropertiesUpdatedEvent {
    pub thread_id: String,
    pub properties: ChatThreadProperties,
    pub updated_by: ChatParticipant,
    /// ISO 8601 time of the update.
    pub updated_on: String,
    #[serde(default)]
    pub version: String,
}

/// One or more participants joined a thread.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantsAddedEvent {
    pub thread_id: String,
    pub participants_added: Vec<ChatParticipant>,
    #[serde(default)]
    pub added_by: ChatParticipant,
    #[serde(default)]
    pub added_on: String,
    #[serde(default)]
    pub version: String,
}

impl ParticipantsAddedEvent {
    /// Identifiers of the participants that joined, in payload order.
    pub fn participant_ids(&self) -> Vec<&str> {
        self.participants_added.iter().map(|p| p.id.as_str()).collect()
    }
}

/// One or more participants left (or were removed from) a thread.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantsRemovedEvent {
    pub thread_id: String,
    pub participants_removed: Vec<ChatParticipant>,
    #[serde(default)]
    pub removed_by: ChatParticipant,
    #[serde(default)]
    pub removed_on: String,
    #[serde(default)]
    pub version: String,
}

impl ParticipantsRemovedEvent {
    /// Identifiers of the participants that left, in payload order.
    pub fn participant_ids(&self) -> Vec<&str> {
        self.participants_removed.iter().map(|p| p.id.as_str()).collect()
    }
}

/// Lifecycle signal: the signaling transport reported `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RealTimeNotificationConnected;

/// Lifecycle signal: the signaling transport reported `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RealTimeNotificationDisconnected;

// ── Tagged union ──────────────────────────────────────────────────────────────

/// A public event: one of the six kinds together with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    ChatMessageReceived(ChatMessageReceivedEvent),
    ChatThreadPropertiesUpdated(ChatThreadPropertiesUpdatedEvent),
    ParticipantsAdded(ParticipantsAddedEvent),
    ParticipantsRemoved(ParticipantsRemovedEvent),
    RealTimeNotificationConnected,
    RealTimeNotificationDisconnected,
}

impl NotificationEvent {
    /// The tag of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            NotificationEvent::ChatMessageReceived(_) => EventKind::ChatMessageReceived,
            NotificationEvent::ChatThreadPropertiesUpdated(_) => {
                EventKind::ChatThreadPropertiesUpdated
            }
            NotificationEvent::ParticipantsAdded(_) => EventKind::ParticipantsAdded,
            NotificationEvent::ParticipantsRemoved(_) => EventKind::ParticipantsRemoved,
            NotificationEvent::RealTimeNotificationConnected => {
                EventKind::RealTimeNotificationConnected
            }
            NotificationEvent::RealTimeNotificationDisconnected => {
                EventKind::RealTimeNotificationDisconnected
            }
        }
    }
}

/// Binds a payload type to its event kind.
///
/// Implemented for the six payload types in this module and nothing else;
/// the set of kinds is closed.
pub trait EventPayload: fmt::Debug + Send + Sync + 'static {
    /// The kind under which listeners for this payload are registered.
    const KIND: EventKind;

    /// Borrows the payload out of `event` if `event` carries this type.
    fn from_event(event: &NotificationEvent) -> Option<&Self>;
}

macro_rules! payload_event {
    ($payload:ty, $variant:ident) => {
        impl EventPayload for $payload {
            const KIND: EventKind = EventKind::$variant;

            fn from_event(event: &NotificationEvent) -> Option<&Self> {
                match event {
                    NotificationEvent::$variant(payload) => Some(payload),
                    _ => None,
                }
            }
        }

        impl From<$payload> for NotificationEvent {
            fn from(payload: $payload) -> Self {
                NotificationEvent::$variant(payload)
            }
        }
    };
}

payload_event!(ChatMessageReceivedEvent, ChatMessageReceived);
payload_event!(ChatThreadPropertiesUpdatedEvent, ChatThreadPropertiesUpdated);
payload_event!(ParticipantsAddedEvent, ParticipantsAdded);
payload_event!(ParticipantsRemovedEvent, ParticipantsRemoved);

impl EventPayload for RealTimeNotificationConnected {
    const KIND: EventKind = EventKind::RealTimeNotificationConnected;

    fn from_event(event: &NotificationEvent) -> Option<&Self> {
        match event {
            NotificationEvent::RealTimeNotificationConnected => Some(&RealTimeNotificationConnected),
            _ => None,
        }
    }
}

impl EventPayload for RealTimeNotificationDisconnected {
    const KIND: EventKind = EventKind::RealTimeNotificationDisconnected;

    fn from_event(event: &NotificationEvent) -> Option<&Self> {
        match event {
            NotificationEvent::RealTimeNotificationDisconnected => {
                Some(&RealTimeNotificationDisconnected)
            }
            _ => None,
        }
    }
}

impl From<RealTimeNotificationConnected> for NotificationEvent {
    fn from(_: RealTimeNotificationConnected) -> Self {
        NotificationEvent::RealTimeNotificationConnected
    }
}

impl From<RealTimeNotificationDisconnected> for NotificationEvent {
    fn from(_: RealTimeNotificationDisconnected) -> Self {
        NotificationEvent::RealTimeNotificationDisconnected
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_parses_every_public_name() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_event_kind_rejects_transport_level_name() {
        // `connectionChanged` exists only on the transport, never publicly.
        let result = "connectionChanged".parse::<EventKind>();
        assert_eq!(result, Err(UnknownEventKind("connectionChanged".to_string())));
    }

    #[test]
    fn test_exactly_two_kinds_are_lifecycle_signals() {
        let signals: Vec<EventKind> = EventKind::ALL
            .into_iter()
            .filter(|k| k.is_lifecycle_signal())
            .collect();
        assert_eq!(
            signals,
            vec![
                EventKind::RealTimeNotificationConnected,
                EventKind::RealTimeNotificationDisconnected
            ]
        );
    }

    #[test]
    fn test_payload_kind_matches_wrapped_event_kind() {
        // Arrange
        let payload = ParticipantsAddedEvent {
            thread_id: "19:thread".to_string(),
            participants_added: vec![ChatParticipant::with_id("u1")],
            ..Default::default()
        };

        // Act
        let event = NotificationEvent::from(payload.clone());

        // Assert
        assert_eq!(event.kind(), ParticipantsAddedEvent::KIND);
        assert_eq!(ParticipantsAddedEvent::from_event(&event), Some(&payload));
        assert_eq!(ChatMessageReceivedEvent::from_event(&event), None);
    }

    #[test]
    fn test_lifecycle_payload_borrows_from_unit_variant() {
        let event = NotificationEvent::from(RealTimeNotificationDisconnected);
        assert_eq!(event.kind(), EventKind::RealTimeNotificationDisconnected);
        assert!(RealTimeNotificationDisconnected::from_event(&event).is_some());
        assert!(RealTimeNotificationConnected::from_event(&event).is_none());
    }

    #[test]
    fn test_participant_ids_preserve_payload_order() {
        let event = ParticipantsRemovedEvent {
            participants_removed: vec![ChatParticipant::with_id("a"), ChatParticipant::with_id("b")],
            ..Default::default()
        };
        assert_eq!(event.participant_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_message_type_uses_type_key_on_the_wire() {
        // Arrange
        let json = r#"{
            "threadId": "19:t",
            "id": "m1",
            "sender": {"id": "u1", "displayName": "Ada"},
            "recipient": {"id": "u2"},
            "message": "hi",
            "type": "text",
            "createdOn": "2024-03-07T10:00:00Z"
        }"#;

        // Act
        let event: ChatMessageReceivedEvent = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(event.message_type, "text");
        assert_eq!(event.sender.display_name.as_deref(), Some("Ada"));
        assert!(event.metadata.is_empty());
    }
}

//! Translation from transport events to public events.
//!
//! This is a pure function with no I/O and no side effects other than a
//! `debug!` log line for dropped connection states.
//!
//! # Translation rules
//!
//! ```text
//! connectionChanged(Connected)      ->  realTimeNotificationConnected
//! connectionChanged(Disconnected)   ->  realTimeNotificationDisconnected
//! connectionChanged(<anything else>)->  (nothing)
//! chatMessageReceived(p)            ->  chatMessageReceived(p)
//! chatThreadPropertiesUpdated(p)    ->  chatThreadPropertiesUpdated(p)
//! participantsAdded(p)              ->  participantsAdded(p)
//! participantsRemoved(p)            ->  participantsRemoved(p)
//! ```
//!
//! Domain payloads pass through unchanged: the transport already delivers
//! them in the shape of the public contract.

use tracing::debug;

use crate::domain::connection::ConnectionState;
use crate::domain::events::NotificationEvent;
use crate::protocol::signals::TransportEvent;

/// Translates one raw transport event into at most one public event.
///
/// Returns `None` for transitional connection states (`Connecting`,
/// `Reconnecting`, `Unknown`).
///
/// # Example
///
/// ```rust
/// use chat_realtime_core::{translate_transport_event, ConnectionState, NotificationEvent, TransportEvent};
///
/// let event = translate_transport_event(TransportEvent::ConnectionChanged(ConnectionState::Connected));
/// assert_eq!(event, Some(NotificationEvent::RealTimeNotificationConnected));
///
/// let dropped = translate_transport_event(TransportEvent::ConnectionChanged(ConnectionState::Reconnecting));
/// assert_eq!(dropped, None);
/// ```
pub fn translate_transport_event(event: TransportEvent) -> Option<NotificationEvent> {
    match event {
        TransportEvent::ConnectionChanged(state) => translate_connection_state(state),
        TransportEvent::ChatMessageReceived(payload) => {
            Some(NotificationEvent::ChatMessageReceived(payload))
        }
        TransportEvent::ChatThreadPropertiesUpdated(payload) => {
            Some(NotificationEvent::ChatThreadPropertiesUpdated(payload))
        }
        TransportEvent::ParticipantsAdded(payload) => {
            Some(NotificationEvent::ParticipantsAdded(payload))
        }
        TransportEvent::ParticipantsRemoved(payload) => {
            Some(NotificationEvent::ParticipantsRemoved(payload))
        }
    }
}

fn translate_connection_state(state: ConnectionState) -> Option<NotificationEvent> {
    match state {
        ConnectionState::Connected => Some(NotificationEvent::RealTimeNotificationConnected),
        ConnectionState::Disconnected => Some(NotificationEvent::RealTimeNotificationDisconnected),
        other => {
            debug!("ignoring transitional connection state {other:?}");
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

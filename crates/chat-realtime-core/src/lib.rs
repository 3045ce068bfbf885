//! # chat-realtime-core
//!
//! Shared library for the chat realtime notification client containing the
//! public event taxonomy, the connection-state model, and the translation from
//! low-level signaling events to public events.
//!
//! It has zero dependencies on async runtimes, network sockets, or the
//! signaling transport itself.
//!
//! # Architecture overview (for beginners)
//!
//! A chat client keeps a persistent *signaling* connection open to a
//! messaging gateway.  The gateway pushes small notifications down that
//! connection whenever something happens in a chat thread: a message
//! arrives, the topic changes, somebody joins or leaves.
//!
//! Two vocabularies are involved:
//!
//! - **`protocol`** – What the signaling transport raises.  Five low-level
//!   event names (`connectionChanged`, `chatMessageReceived`, ...) with raw
//!   payloads.
//!
//! - **`domain`** – What applications subscribe to.  A fixed, closed set of
//!   six public event kinds: four *domain events* describing chat activity and
//!   two zero-payload *lifecycle signals* (`realTimeNotificationConnected`,
//!   `realTimeNotificationDisconnected`).
//!
//! [`protocol::translate::translate_transport_event`] maps the first
//! vocabulary onto the second.

pub mod domain;
pub mod protocol;

pub use domain::connection::ConnectionState;
pub use domain::events::{
    ChatMessageReceivedEvent, ChatParticipant, ChatThreadProperties,
    ChatThreadPropertiesUpdatedEvent, EventKind, EventPayload, NotificationEvent,
    ParticipantsAddedEvent, ParticipantsRemovedEvent, RealTimeNotificationConnected,
    RealTimeNotificationDisconnected, UnknownEventKind,
};
pub use protocol::signals::{TransportEvent, TransportEventName};
pub use protocol::translate::translate_transport_event;

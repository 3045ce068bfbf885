//! chat-realtime-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does this crate do? (for beginners)
//!
//! A chat application wants to hear about new messages the moment they are
//! posted, not on the next poll.  The messaging gateway pushes notifications
//! over a persistent *signaling* connection owned by a transport object.  This
//! crate sits between that transport and the application:
//!
//! 1. [`ChatClient::start_realtime_notifications`] starts the transport and
//!    bridges its low-level events into the client.
//! 2. The event router translates each raw transport event into a public
//!    [`NotificationEvent`](chat_realtime_core::NotificationEvent).
//! 3. The event bus fans each public event out to every listener the
//!    application registered with [`ChatClient::on`].
//! 4. [`ChatClient::stop_realtime_notifications`] stops the transport and
//!    drops every registered listener.
//!
//! The transport itself, the credential it authenticates with, and the
//! factory that builds it are external collaborators described by the traits
//! in [`application::transport`].
//!
//! [`ChatClient::start_realtime_notifications`]: application::session::ChatClient::start_realtime_notifications
//! [`ChatClient::stop_realtime_notifications`]: application::session::ChatClient::stop_realtime_notifications
//! [`ChatClient::on`]: application::session::ChatClient::on

/// Application layer: session lifecycle, event bus, and event router.
pub mod application;

/// Infrastructure layer: configuration files, loopback transport, and replay.
pub mod infrastructure;

pub use application::event_bus::{EventBus, Listener};
pub use application::session::{ChatClient, NotificationError};
pub use application::transport::{
    AccessToken, CredentialError, SignalingTransport, TokenCredential, TransportError,
    TransportFactory, TransportHandler, TransportOptions, DEFAULT_GATEWAY_API_VERSION,
};

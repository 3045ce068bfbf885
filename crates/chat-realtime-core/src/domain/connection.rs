//! Connection state reported by the signaling transport.
//!
//! The transport reports every state it passes through, including
//! transitional ones such as `Connecting` while a socket handshake is in
//! progress.  Only the two terminal states, [`ConnectionState::Connected`]
//! and [`ConnectionState::Disconnected`], are of interest to applications;
//! the event router drops everything else.

use serde::{Deserialize, Serialize};

/// A connection state value as raised by the signaling transport.
///
/// # Serde representation
///
/// States are serialized as their PascalCase variant name (`"Connected"`).
/// Any unrecognized string deserializes to [`ConnectionState::Unknown`] so a
/// newer transport reporting a state this client does not know about is
/// tolerated instead of rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    /// The transport is connected and notifications can flow.
    Connected,
    /// The transport has lost (or closed) its connection.
    Disconnected,
    /// The initial connection attempt is in progress.
    Connecting,
    /// The transport is re-establishing a dropped connection.
    Reconnecting,
    /// A state value not known to this client.
    #[serde(other)]
    Unknown,
}

impl ConnectionState {
    /// Returns `true` for the two states that map to lifecycle signals.
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::Disconnected)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

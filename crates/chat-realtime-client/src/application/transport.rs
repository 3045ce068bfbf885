//! Contracts for the external collaborators of the notification client.
//!
//! None of these are implemented by the application layer:
//!
//! - [`SignalingTransport`] – the persistent-connection object that receives
//!   push notifications from the messaging gateway.  Its wire protocol is
//!   entirely its own business.
//! - [`TransportFactory`] – builds a transport from a credential and
//!   [`TransportOptions`], or reports that the runtime environment cannot host
//!   one by returning `None`.
//! - [`TokenCredential`] – a renewable access-token provider.  The client
//!   passes it to the factory unchanged and never calls it itself.
//!
//! # Why traits? (for beginners)
//!
//! The `ChatClient` in [`session`](super::session) only ever talks to these
//! traits.  Tests substitute the in-process loopback transport (or a
//! `mockall` mock), while a production build plugs in a real signaling
//! client.  Neither requires touching the lifecycle or routing code.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chat_realtime_core::{TransportEvent, TransportEventName};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gateway API version requested when the options do not name one.
pub const DEFAULT_GATEWAY_API_VERSION: &str = "2024-03-07";

/// Errors raised by a signaling transport while starting or stopping.
///
/// The client propagates these to its caller unchanged and never retries;
/// retry policy belongs to the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport could not establish its connection.
    #[error("failed to connect signaling transport: {0}")]
    Connect(String),
    /// The transport was already closed.
    #[error("signaling transport is closed")]
    Closed,
    /// Any other transport-specific failure.
    #[error("signaling transport error: {0}")]
    Other(String),
}

/// Errors raised by a [`TokenCredential`].
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to acquire access token: {0}")]
    Acquire(String),
}

/// An access token and its expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    /// Expiry as seconds since the Unix epoch.
    pub expires_on: u64,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// A renewable access-token provider.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Returns a currently valid token, refreshing it if necessary.
    async fn get_token(&self) -> Result<AccessToken, CredentialError>;
}

/// Callback registered on a transport for one event name.
///
/// The transport invokes it synchronously, in the order it raises events,
/// and only with events whose [`TransportEvent::name`] matches the name it
/// was registered under.  The transport drops it on
/// [`SignalingTransport::stop`], even a failed one.
pub type TransportHandler = Arc<dyn Fn(TransportEvent) + Send + Sync>;

/// A persistent signaling connection to the messaging gateway.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignalingTransport: Send + Sync {
    /// Connects to the gateway.  Suspends until the transport is ready.
    async fn start(&self) -> Result<(), TransportError>;

    /// Disconnects from the gateway.
    ///
    /// Every handler registered with [`on`](Self::on) is released when this
    /// returns, whether it returns `Ok` or an error.  A started-again
    /// transport raises nothing until handlers are registered anew.
    async fn stop(&self) -> Result<(), TransportError>;

    /// Registers `handler` for events raised under `name`.
    fn on(&self, name: TransportEventName, handler: TransportHandler);
}

/// Options handed to a [`TransportFactory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportOptions {
    /// Endpoint of the communication resource, e.g.
    /// `https://<resource>.communication.azure.com`.
    #[serde(default)]
    pub resource_endpoint: String,
    /// Gateway API version string.
    #[serde(default = "default_gateway_api_version")]
    pub gateway_api_version: String,
    /// Transport-specific options, forwarded to the transport unchanged.
    #[serde(default)]
    pub passthrough: BTreeMap<String, serde_json::Value>,
}

fn default_gateway_api_version() -> String {
    DEFAULT_GATEWAY_API_VERSION.to_string()
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            resource_endpoint: String::new(),
            gateway_api_version: default_gateway_api_version(),
            passthrough: BTreeMap::new(),
        }
    }
}

impl TransportOptions {
    /// Options for `endpoint` with the default API version.
    pub fn for_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            resource_endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

/// Builds a signaling transport for a client.
pub trait TransportFactory: Send + Sync {
    /// Returns a transport, or `None` when the runtime environment does not
    /// support realtime notifications.
    ///
    /// `span` is the client's tracing span; transports should record their
    /// own log events inside it so they are attributed to the owning client.
    fn create(
        &self,
        credential: Arc<dyn TokenCredential>,
        span: &tracing::Span,
        options: &TransportOptions,
    ) -> Option<Arc<dyn SignalingTransport>>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

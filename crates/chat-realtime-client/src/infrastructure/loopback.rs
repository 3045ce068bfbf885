//! In-process loopback signaling transport.
//!
//! # Why a loopback transport?
//!
//! A real signaling transport holds a network connection to the messaging
//! gateway.  That makes it unusable in unit tests and pointless for replaying
//! recorded traffic.  The `LoopbackTransport` implements the same
//! [`SignalingTransport`] contract with no network at all: the host program
//! calls [`LoopbackTransport::raise`] and the event is handed to whatever
//! handlers are registered for its name, synchronously, exactly as a real
//! transport would.
//!
//! It also records how often `start` and `stop` were called, so tests can
//! assert idempotence without a mocking framework.
//!
//! # Connection announcements
//!
//! Built with [`LoopbackTransport::with_connection_announcements`], the
//! transport raises `connectionChanged(Connecting)` and then
//! `connectionChanged(Connected)` while starting, and
//! `connectionChanged(Disconnected)` while stopping, like a real transport
//! going through its connection lifecycle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chat_realtime_core::{ConnectionState, TransportEvent, TransportEventName};
use tracing::{debug, info};

use crate::application::transport::{
    AccessToken, CredentialError, SignalingTransport, TokenCredential, TransportError,
    TransportFactory, TransportHandler, TransportOptions,
};

/// A signaling transport whose events are raised by the host program.
#[derive(Default)]
pub struct LoopbackTransport {
    handlers: Mutex<HashMap<TransportEventName, Vec<TransportHandler>>>,
    running: AtomicBool,
    announce_connection: bool,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    fail_next_start: Mutex<Option<String>>,
}

impl LoopbackTransport {
    /// Creates a silent loopback transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loopback transport that raises connection-state changes
    /// while starting and stopping.
    pub fn with_connection_announcements() -> Self {
        Self {
            announce_connection: true,
            ..Self::default()
        }
    }

    fn handlers(&self) -> MutexGuard<'_, HashMap<TransportEventName, Vec<TransportHandler>>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next `start` fail with [`TransportError::Connect`].
    pub fn fail_next_start(&self, reason: impl Into<String>) {
        *self
            .fail_next_start
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(reason.into());
    }

    /// Hands `event` to every handler registered under its name.
    ///
    /// Returns the number of handlers invoked.  Handlers run outside the
    /// registry lock, so they may register further handlers.
    pub fn raise(&self, event: TransportEvent) -> usize {
        let name = event.name();
        let snapshot: Vec<TransportHandler> = self
            .handlers()
            .get(&name)
            .map(|handlers| handlers.iter().map(Arc::clone).collect())
            .unwrap_or_default();

        for handler in &snapshot {
            handler(event.clone());
        }
        debug!("loopback raised {name} to {} handler(s)", snapshot.len());
        snapshot.len()
    }

    /// Number of handlers registered under `name`.
    pub fn handler_count(&self, name: TransportEventName) -> usize {
        self.handlers().get(&name).map_or(0, Vec::len)
    }

    /// Returns `true` between a successful `start` and the next `stop`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// How many times `start` has been called.
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    /// How many times `stop` has been called.
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalingTransport for LoopbackTransport {
    async fn start(&self) -> Result<(), TransportError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);

        let failure = self
            .fail_next_start
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(reason) = failure {
            return Err(TransportError::Connect(reason));
        }

        if self.announce_connection {
            self.raise(TransportEvent::ConnectionChanged(ConnectionState::Connecting));
        }
        self.running.store(true, Ordering::Release);
        if self.announce_connection {
            self.raise(TransportEvent::ConnectionChanged(ConnectionState::Connected));
        }
        info!("loopback transport started");
        Ok(())
    }

    async fn stop(&self) -> Result<(), TransportError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);

        let was_running = self.running.swap(false, Ordering::AcqRel);
        if was_running && self.announce_connection {
            self.raise(TransportEvent::ConnectionChanged(ConnectionState::Disconnected));
        }
        // A stopped transport releases every handler registered on it.
        self.handlers().clear();
        info!("loopback transport stopped");
        Ok(())
    }

    fn on(&self, name: TransportEventName, handler: TransportHandler) {
        self.handlers().entry(name).or_default().push(handler);
    }
}

// ── Factory ───────────────────────────────────────────────────────────────────

/// A [`TransportFactory`] that always hands out the same loopback transport,
/// or none at all when built with [`LoopbackTransportFactory::unsupported`].
pub struct LoopbackTransportFactory {
    transport: Option<Arc<LoopbackTransport>>,
    last_options: Mutex<Option<TransportOptions>>,
}

impl LoopbackTransportFactory {
    /// A factory that binds `transport` to every client it creates.
    pub fn new(transport: Arc<LoopbackTransport>) -> Self {
        Self {
            transport: Some(transport),
            last_options: Mutex::new(None),
        }
    }

    /// A factory for an environment without realtime transport support.
    pub fn unsupported() -> Self {
        Self {
            transport: None,
            last_options: Mutex::new(None),
        }
    }

    /// The options passed to the most recent `create` call.
    pub fn last_options(&self) -> Option<TransportOptions> {
        self.last_options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TransportFactory for LoopbackTransportFactory {
    fn create(
        &self,
        _credential: Arc<dyn TokenCredential>,
        span: &tracing::Span,
        options: &TransportOptions,
    ) -> Option<Arc<dyn SignalingTransport>> {
        *self
            .last_options
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(options.clone());

        let transport = self.transport.as_ref()?;
        span.in_scope(|| {
            debug!(
                "binding loopback transport for {} (api {})",
                options.resource_endpoint, options.gateway_api_version
            )
        });
        Some(Arc::clone(transport) as Arc<dyn SignalingTransport>)
    }
}

// ── Credential ────────────────────────────────────────────────────────────────

/// A credential that always returns the same token.
///
/// Suitable for loopback sessions and tests, where nothing validates it.
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self) -> Result<AccessToken, CredentialError> {
        Ok(AccessToken {
            token: self.token.clone(),
            expires_on: u64::MAX,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! `ChatClient`: realtime notification lifecycle and the public event facade.
//!
//! # State machine
//!
//! ```text
//!            start_realtime_notifications()
//!   ┌──────┐ ────────────────────────────────▶ ┌────────┐
//!   │ Idle │                                   │ Active │
//!   └──────┘ ◀──────────────────────────────── └────────┘
//!            stop_realtime_notifications()
//!            (drops every registered listener)
//! ```
//!
//! - `start` from Active is a successful no-op.
//! - `stop` from Idle still stops the transport and clears the bus.
//! - Domain-event subscriptions are refused while Idle; lifecycle-signal
//!   subscriptions are accepted in either state.
//! - The client counts as Active from the moment it asks the transport to
//!   start.  If the transport fails to start, the client falls back to Idle.
//!   A listener for `RealTimeNotificationConnected` raised during start can
//!   therefore subscribe to domain events right away.
//!
//! # Capability
//!
//! The transport factory may decline to build a transport (the runtime
//! environment cannot host one).  The client then holds
//! `TransportBinding::Incapable` for its whole life and every public
//! operation fails with [`NotificationError::Unsupported`].
//!
//! # Concurrency
//!
//! At most one `start`/`stop` runs at a time.  A lifecycle call made while
//! another is still in flight fails with
//! [`NotificationError::LifecycleInProgress`] instead of queueing behind it.
//!
//! `on` and `off` are accepted while a start is in flight, so listeners can
//! subscribe from inside a lifecycle-signal listener.  While a stop is in
//! flight they fail with `LifecycleInProgress`: the stop is about to drop
//! every listener, and a registration accepted now would vanish unnoticed.
//!
//! # Bridging order
//!
//! The event router is installed on the transport *before* the transport is
//! started, so lifecycle signals raised while the transport is coming up are
//! never lost.  Domain events raised before the client reaches Active are
//! dropped by the router's gate.
//!
//! A transport releases its handlers when it stops, whether or not the stop
//! succeeds, so the bridge is installed again on the first start after any
//! stop.  A failed start keeps its bridge; retrying does not stack a second
//! set.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chat_realtime_core::{EventKind, EventPayload};
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use super::event_bus::{EventBus, Listener};
use super::router;
use super::transport::{
    SignalingTransport, TokenCredential, TransportError, TransportFactory, TransportOptions,
};

/// Errors returned by [`ChatClient`] operations.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The runtime environment has no signaling transport.  Not retryable.
    #[error("realtime notifications unsupported in this environment")]
    Unsupported,
    /// A domain event was subscribed to before notifications were started.
    /// Call `start_realtime_notifications` and retry.
    #[error("must start realtime notifications before subscribing")]
    NotStarted,
    /// Another `start`/`stop` call on the same client has not finished yet.
    #[error("a realtime notification start/stop is already in progress")]
    LifecycleInProgress,
    /// The transport failed while starting or stopping.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

enum TransportBinding {
    Capable(Arc<dyn SignalingTransport>),
    Incapable,
}

/// A chat client session with realtime notifications.
pub struct ChatClient {
    session_id: Uuid,
    span: Span,
    binding: TransportBinding,
    started: Arc<AtomicBool>,
    bridged: AtomicBool,
    bus: Arc<EventBus>,
    lifecycle: tokio::sync::Mutex<()>,
    /// `true` while a stop is in flight.  Held across the check-and-add in
    /// `on`/`off` and across the final `bus.clear()` in stop.
    stopping: Mutex<bool>,
}

impl ChatClient {
    /// Creates a client, asking `factory` for its one signaling transport.
    ///
    /// `credential` is passed to the factory unchanged.
    pub fn new(
        factory: &dyn TransportFactory,
        credential: Arc<dyn TokenCredential>,
        options: &TransportOptions,
    ) -> Self {
        let session_id = Uuid::new_v4();
        let span = info_span!("chat_client", %session_id);

        let binding = match factory.create(credential, &span, options) {
            Some(transport) => TransportBinding::Capable(transport),
            None => {
                span.in_scope(|| {
                    warn!("signaling transport unavailable; realtime notifications disabled")
                });
                TransportBinding::Incapable
            }
        };

        span.in_scope(|| {
            debug!(
                endpoint = %options.resource_endpoint,
                api_version = %options.gateway_api_version,
                "chat client created"
            )
        });

        Self {
            session_id,
            span,
            binding,
            started: Arc::new(AtomicBool::new(false)),
            bridged: AtomicBool::new(false),
            bus: Arc::new(EventBus::new()),
            lifecycle: tokio::sync::Mutex::new(()),
            stopping: Mutex::new(false),
        }
    }

    /// Identifier of this client, also recorded on its tracing span.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Returns `true` if a signaling transport is bound to this client.
    pub fn supports_realtime_notifications(&self) -> bool {
        matches!(self.binding, TransportBinding::Capable(_))
    }

    /// Returns `true` while notifications are started (Active).
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Number of listeners currently registered under `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.bus.listener_count(kind)
    }

    fn stop_gate(&self) -> std::sync::MutexGuard<'_, bool> {
        self.stopping.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transport(&self) -> Result<&Arc<dyn SignalingTransport>, NotificationError> {
        match &self.binding {
            TransportBinding::Capable(transport) => Ok(transport),
            TransportBinding::Incapable => Err(NotificationError::Unsupported),
        }
    }

    /// Starts the signaling transport and begins delivering events.
    ///
    /// Calling this while already started does nothing and succeeds.
    ///
    /// Events raised by the transport while it is starting are delivered:
    /// the client is Active for the duration of the call, and falls back to
    /// Idle if the transport fails.
    ///
    /// # Errors
    ///
    /// - [`NotificationError::Unsupported`] without a transport.
    /// - [`NotificationError::LifecycleInProgress`] if another start/stop is running.
    /// - [`NotificationError::Transport`] if the transport fails to start;
    ///   the client stays Idle.
    pub async fn start_realtime_notifications(&self) -> Result<(), NotificationError> {
        let transport = self.transport()?;
        let _lifecycle = self
            .lifecycle
            .try_lock()
            .map_err(|_| NotificationError::LifecycleInProgress)?;

        self.start_inner(transport.as_ref())
            .instrument(self.span.clone())
            .await
    }

    async fn start_inner(&self, transport: &dyn SignalingTransport) -> Result<(), NotificationError> {
        if self.is_started() {
            debug!("realtime notifications already started");
            return Ok(());
        }

        if !self.bridged.swap(true, Ordering::AcqRel) {
            router::bridge(transport, Arc::clone(&self.bus), Arc::clone(&self.started));
        }

        self.started.store(true, Ordering::Release);
        if let Err(e) = transport.start().await {
            self.started.store(false, Ordering::Release);
            warn!("signaling transport failed to start: {e}");
            return Err(e.into());
        }
        info!("realtime notifications started");
        Ok(())
    }

    /// Stops the signaling transport and removes every registered listener.
    ///
    /// Listeners of all kinds, lifecycle signals included, are dropped:
    /// callers must subscribe again after the next start.  The listeners are
    /// dropped even when the transport reports an error while stopping.
    ///
    /// # Errors
    ///
    /// - [`NotificationError::Unsupported`] without a transport, whatever the state.
    /// - [`NotificationError::LifecycleInProgress`] if another start/stop is running.
    /// - [`NotificationError::Transport`] if the transport fails to stop.
    pub async fn stop_realtime_notifications(&self) -> Result<(), NotificationError> {
        let transport = self.transport()?;
        let _lifecycle = self
            .lifecycle
            .try_lock()
            .map_err(|_| NotificationError::LifecycleInProgress)?;

        self.stop_inner(transport.as_ref())
            .instrument(self.span.clone())
            .await
    }

    async fn stop_inner(&self, transport: &dyn SignalingTransport) -> Result<(), NotificationError> {
        {
            let mut stopping = self.stop_gate();
            *stopping = true;
        }
        self.started.store(false, Ordering::Release);

        let stopped = transport.stop().await;
        self.bridged.store(false, Ordering::Release);
        {
            let mut stopping = self.stop_gate();
            self.bus.clear();
            *stopping = false;
        }

        match stopped {
            Ok(()) => {
                info!("realtime notifications stopped");
                Ok(())
            }
            Err(e) => {
                warn!("signaling transport failed to stop cleanly: {e}");
                Err(e.into())
            }
        }
    }

    /// Subscribes `listener` to events of kind `E::KIND`.
    ///
    /// Multiple listeners per kind are allowed; all of them receive each event
    /// in registration order.
    ///
    /// # Errors
    ///
    /// - [`NotificationError::Unsupported`] without a transport.
    /// - [`NotificationError::LifecycleInProgress`] while a stop is in flight.
    /// - [`NotificationError::NotStarted`] for a domain event while Idle.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let on_added = Listener::new(|e: &ParticipantsAddedEvent| {
    ///     println!("joined: {:?}", e.participant_ids());
    /// });
    /// client.start_realtime_notifications().await?;
    /// client.on(&on_added)?;
    /// ```
    pub fn on<E: EventPayload>(&self, listener: &Listener<E>) -> Result<(), NotificationError> {
        self.transport()?;
        let stopping = self.stop_gate();
        if *stopping {
            return Err(NotificationError::LifecycleInProgress);
        }
        if !E::KIND.is_lifecycle_signal() && !self.is_started() {
            return Err(NotificationError::NotStarted);
        }
        self.bus.add(listener);
        Ok(())
    }

    /// Unsubscribes the first registration of `listener` under `E::KIND`.
    ///
    /// Removing a listener that is not registered is not an error.  Lifecycle
    /// signal listeners can be removed like any other.
    ///
    /// # Errors
    ///
    /// - [`NotificationError::Unsupported`] without a transport.
    /// - [`NotificationError::LifecycleInProgress`] while a stop is in flight.
    pub fn off<E: EventPayload>(&self, listener: &Listener<E>) -> Result<(), NotificationError> {
        self.transport()?;
        let stopping = self.stop_gate();
        if *stopping {
            return Err(NotificationError::LifecycleInProgress);
        }
        if !self.bus.remove(listener) {
            self.span
                .in_scope(|| debug!("off({}) for a listener that is not registered", E::KIND));
        }
        Ok(())
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("session_id", &self.session_id)
            .field("supported", &self.supports_realtime_notifications())
            .field("started", &self.is_started())
            .field("listeners", &self.bus)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Event bus: the per-client registry of public event listeners.
//!
//! The bus maps each [`EventKind`] to an ordered list of listener
//! registrations and supports three operations: add, remove, and publish
//! (plus a bulk `clear` used by teardown).
//!
//! # Listener identity
//!
//! A [`Listener`] wraps its callback in an `Arc`.  Cloning a listener clones
//! the `Arc`, so every clone refers to the *same* listener: registering a
//! clone and removing the original (or vice versa) works.  Two listeners
//! created from identical closures are still different listeners.
//!
//! # Delivery
//!
//! [`EventBus::publish`] takes a snapshot of the registrations for the event's
//! kind, releases the lock, and then invokes each listener synchronously in
//! registration order.  Because no lock is held during delivery, a listener
//! may subscribe or unsubscribe (itself included) while it runs; the change
//! takes effect from the next publish.
//!
//! A listener that panics is caught and logged with `error!`; the remaining
//! listeners still receive the event.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chat_realtime_core::{EventKind, EventPayload, NotificationEvent};
use tracing::{error, trace, warn};

type Dispatch = Arc<dyn Fn(&NotificationEvent) + Send + Sync>;

/// Identity of a listener: the address of its shared callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListenerId(usize);

/// A typed listener for events carrying payload `E`.
///
/// The payload type fixes the event kind the listener can be registered
/// under (see [`EventPayload::KIND`]).
pub struct Listener<E: EventPayload> {
    callback: Arc<dyn Fn(&E) + Send + Sync>,
}

impl<E: EventPayload> Listener<E> {
    /// Creates a listener from a synchronous callback.
    pub fn new(callback: impl Fn(&E) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Creates a listener that hands each event to an asynchronous callback.
    ///
    /// Every delivery spawns the returned future on the current tokio runtime
    /// and returns immediately, so a slow async listener never holds up its
    /// siblings.  A panic inside the future is logged with `error!`, as for
    /// synchronous listeners.  Deliveries made outside a runtime are dropped
    /// with a warning.
    pub fn spawning<F, Fut>(callback: F) -> Self
    where
        E: Clone,
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::new(move |event: &E| match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let delivery = handle.spawn(callback(event.clone()));
                handle.spawn(async move {
                    if let Err(e) = delivery.await {
                        if e.is_panic() {
                            let cause = e.into_panic();
                            error!(
                                "async listener for {} panicked: {}",
                                E::KIND,
                                panic_message(cause.as_ref())
                            );
                        }
                    }
                });
            }
            Err(_) => warn!("no tokio runtime; dropping async delivery of {}", E::KIND),
        })
    }

    /// Returns `true` if `other` is this listener or a clone of it.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }

    fn id(&self) -> ListenerId {
        ListenerId(Arc::as_ptr(&self.callback) as *const () as usize)
    }

    fn to_dispatch(&self) -> Dispatch {
        let callback = Arc::clone(&self.callback);
        Arc::new(move |event: &NotificationEvent| {
            if let Some(payload) = E::from_event(event) {
                callback(payload);
            }
        })
    }
}

impl<E: EventPayload> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<E: EventPayload> fmt::Debug for Listener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("kind", &E::KIND)
            .field("id", &self.id().0)
            .finish()
    }
}

struct Registration {
    id: ListenerId,
    dispatch: Dispatch,
}

/// Registry of listeners keyed by event kind.
///
/// Owned by exactly one `ChatClient`; never shared between clients.
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<HashMap<EventKind, Vec<Registration>>>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<EventKind, Vec<Registration>>> {
        // Listeners never run under this lock, so poisoning can only come
        // from a panic inside the bus itself; the map is still consistent.
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `listener` under `E::KIND`.
    ///
    /// Registering the same listener twice makes it receive each event twice.
    pub fn add<E: EventPayload>(&self, listener: &Listener<E>) {
        self.lock()
            .entry(E::KIND)
            .or_default()
            .push(Registration {
                id: listener.id(),
                dispatch: listener.to_dispatch(),
            });
        trace!("listener added for {}", E::KIND);
    }

    /// Removes the first registration of `listener` under `E::KIND`.
    ///
    /// Returns `false` (and does nothing) if it was not registered.
    pub fn remove<E: EventPayload>(&self, listener: &Listener<E>) -> bool {
        let mut guard = self.lock();
        let Some(registrations) = guard.get_mut(&E::KIND) else {
            return false;
        };
        let id = listener.id();
        match registrations.iter().position(|r| r.id == id) {
            Some(index) => {
                registrations.remove(index);
                trace!("listener removed for {}", E::KIND);
                true
            }
            None => false,
        }
    }

    /// Delivers `event` to every listener currently registered for its kind.
    ///
    /// Returns the number of listeners that completed without panicking.
    pub fn publish(&self, event: &NotificationEvent) -> usize {
        let kind = event.kind();
        let snapshot: Vec<Dispatch> = match self.lock().get(&kind) {
            Some(registrations) => registrations
                .iter()
                .map(|r| Arc::clone(&r.dispatch))
                .collect(),
            None => return 0,
        };

        let mut delivered = 0;
        for dispatch in snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| dispatch(event))) {
                Ok(()) => delivered += 1,
                Err(cause) => {
                    error!(
                        "listener for {kind} panicked: {}",
                        panic_message(cause.as_ref())
                    );
                }
            }
        }
        delivered
    }

    /// Removes every listener of every kind.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of listeners currently registered under `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.lock().get(&kind).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.lock();
        let mut map = f.debug_map();
        for kind in EventKind::ALL {
            if let Some(registrations) = guard.get(&kind) {
                map.entry(&kind, &registrations.len());
            }
        }
        map.finish()
    }
}

fn panic_message(cause: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = cause.downcast_ref::<&str>() {
        message
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Event router: bridges transport events onto the client's event bus.
//!
//! [`bridge`] registers exactly one handler on the transport for each of the
//! five [`TransportEventName`]s.  Each handler translates the raw event with
//! [`translate_transport_event`] and publishes the result on the bus in the
//! same call: no buffering, no reordering, no I/O.
//!
//! # Gating
//!
//! Domain events are only published while the `started` flag is set.  The
//! two lifecycle signals are published regardless, because connection-state
//! transitions happen while the transport is still coming up and are exactly
//! what a pre-start subscriber wants to observe.
//!
//! The router never removes its handlers.  Stopping the transport is what
//! releases them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chat_realtime_core::{translate_transport_event, TransportEvent, TransportEventName};
use tracing::debug;

use super::event_bus::EventBus;
use super::transport::{SignalingTransport, TransportHandler};

/// Installs one bridging handler per transport event name.
pub fn bridge(transport: &dyn SignalingTransport, bus: Arc<EventBus>, started: Arc<AtomicBool>) {
    for name in TransportEventName::ALL {
        let bus = Arc::clone(&bus);
        let started = Arc::clone(&started);
        let handler: TransportHandler =
            Arc::new(move |event: TransportEvent| route(&bus, &started, event));
        transport.on(name, handler);
    }
    debug!("bridged {} transport events", TransportEventName::ALL.len());
}

fn route(bus: &EventBus, started: &AtomicBool, event: TransportEvent) {
    let name = event.name();
    let Some(public) = translate_transport_event(event) else {
        return;
    };

    let kind = public.kind();
    if !kind.is_lifecycle_signal() && !started.load(Ordering::Acquire) {
        debug!("dropping {name} raised while notifications are stopped");
        return;
    }

    let delivered = bus.publish(&public);
    debug!("{name} -> {kind}: delivered to {delivered} listener(s)");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

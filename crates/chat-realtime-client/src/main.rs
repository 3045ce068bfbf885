//! Chat realtime replay tool.
//!
//! Builds a `ChatClient` over the in-process loopback transport, starts
//! realtime notifications, replays a JSON-lines file of recorded transport
//! events through it, stops, and logs how many events each public event kind
//! delivered.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config_from()            -- TOML config (log level, transport options)
//!  └─ ChatClient::new()             -- binds the loopback transport via its factory
//!  └─ on(lifecycle signals)         -- allowed before start
//!  └─ start_realtime_notifications()
//!  └─ on(domain events)
//!  └─ replay()                      -- raises every recorded event on the transport
//!  └─ stop_realtime_notifications() -- clears every listener
//! ```
//!
//! # Usage
//!
//! ```text
//! chat-realtime-replay --events morning.jsonl
//! chat-realtime-replay --events morning.jsonl --only participantsAdded --log-level debug
//! chat-realtime-replay --events morning.jsonl --unsupported   # simulate no transport
//! chat-realtime-replay --config chat-realtime.toml --init-config
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_realtime_client::infrastructure::{
    config::{load_config_from, save_config_to},
    loopback::{LoopbackTransport, LoopbackTransportFactory, StaticTokenCredential},
    replay::{read_events_from, replay},
};
use chat_realtime_client::{ChatClient, Listener, NotificationError};
use chat_realtime_core::{
    ChatMessageReceivedEvent, ChatThreadPropertiesUpdatedEvent, EventKind, EventPayload,
    ParticipantsAddedEvent, ParticipantsRemovedEvent, RealTimeNotificationConnected,
    RealTimeNotificationDisconnected,
};

/// Replay recorded signaling events through a chat realtime notification client.
#[derive(Parser, Debug)]
#[command(name = "chat-realtime-replay", version)]
struct Args {
    /// Path to the TOML configuration file (missing file = defaults).
    #[arg(long, env = "CHAT_REALTIME_CONFIG", default_value = "chat-realtime.toml")]
    config: PathBuf,

    /// JSON-lines file of transport events to replay.
    #[arg(long, required_unless_present = "init_config")]
    events: Option<PathBuf>,

    /// Write the effective configuration to `--config` and exit.
    #[arg(long)]
    init_config: bool,

    /// Overrides the configured log level when `RUST_LOG` is unset.
    #[arg(long)]
    log_level: Option<String>,

    /// Subscribe only to these domain event kinds (repeatable).
    #[arg(long = "only", value_name = "KIND")]
    only: Vec<EventKind>,

    /// Simulate an environment without realtime transport support.
    #[arg(long)]
    unsupported: bool,
}

type Deliveries = Arc<Mutex<BTreeMap<EventKind, usize>>>;

/// Subscribes a listener that logs each `E` and counts it in `deliveries`.
fn subscribe<E: EventPayload>(
    client: &ChatClient,
    deliveries: &Deliveries,
) -> Result<(), NotificationError> {
    let deliveries = Arc::clone(deliveries);
    client.on(&Listener::new(move |event: &E| {
        info!("{}: {event:?}", E::KIND);
        if let Ok(mut counts) = deliveries.lock() {
            *counts.entry(E::KIND).or_default() += 1;
        }
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config_from(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?
        .with_log_level(args.log_level.as_deref());

    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.client.log_level)),
        )
        .init();

    if args.init_config {
        save_config_to(&args.config, &config)
            .with_context(|| format!("writing config to {}", args.config.display()))?;
        info!("wrote configuration to {}", args.config.display());
        return Ok(());
    }
    let Some(events_path) = args.events.as_deref() else {
        anyhow::bail!("--events is required unless --init-config is given");
    };

    // ── Client over a loopback transport ──────────────────────────────────────
    let transport = Arc::new(LoopbackTransport::with_connection_announcements());
    let factory = if args.unsupported {
        LoopbackTransportFactory::unsupported()
    } else {
        LoopbackTransportFactory::new(Arc::clone(&transport))
    };
    let client = ChatClient::new(
        &factory,
        Arc::new(StaticTokenCredential::new("loopback")),
        &config.transport,
    );
    info!(session_id = %client.session_id(), "chat realtime replay starting");

    let events = read_events_from(events_path)
        .with_context(|| format!("reading events from {}", events_path.display()))?;

    // ── Subscriptions and lifecycle ───────────────────────────────────────────
    let deliveries: Deliveries = Arc::default();
    subscribe::<RealTimeNotificationConnected>(&client, &deliveries)?;
    subscribe::<RealTimeNotificationDisconnected>(&client, &deliveries)?;

    client
        .start_realtime_notifications()
        .await
        .context("starting realtime notifications")?;

    let wanted = |kind: EventKind| args.only.is_empty() || args.only.contains(&kind);
    if wanted(EventKind::ChatMessageReceived) {
        subscribe::<ChatMessageReceivedEvent>(&client, &deliveries)?;
    }
    if wanted(EventKind::ChatThreadPropertiesUpdated) {
        subscribe::<ChatThreadPropertiesUpdatedEvent>(&client, &deliveries)?;
    }
    if wanted(EventKind::ParticipantsAdded) {
        subscribe::<ParticipantsAddedEvent>(&client, &deliveries)?;
    }
    if wanted(EventKind::ParticipantsRemoved) {
        subscribe::<ParticipantsRemovedEvent>(&client, &deliveries)?;
    }

    let summary = replay(&transport, events);

    client
        .stop_realtime_notifications()
        .await
        .context("stopping realtime notifications")?;

    // ── Summary ───────────────────────────────────────────────────────────────
    info!(
        "replayed {} transport events ({} handler invocations)",
        summary.raised, summary.handlers_invoked
    );
    if let Ok(counts) = deliveries.lock() {
        for kind in EventKind::ALL {
            info!("{kind}: {} delivered", counts.get(&kind).copied().unwrap_or(0));
        }
    }

    info!("chat realtime replay finished");
    Ok(())
}

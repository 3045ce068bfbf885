//! Benchmarks for event fan-out through the event bus and router.
//!
//! Run with `cargo bench --package chat-realtime-client`.

use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use chat_realtime_client::infrastructure::loopback::{
    LoopbackTransport, LoopbackTransportFactory, StaticTokenCredential,
};
use chat_realtime_client::{ChatClient, EventBus, Listener, TransportOptions};
use chat_realtime_core::{
    ChatMessageReceivedEvent, ChatParticipant, NotificationEvent, TransportEvent,
};

fn message() -> ChatMessageReceivedEvent {
    ChatMessageReceivedEvent {
        thread_id: "19:bench".to_string(),
        id: "m1".to_string(),
        sender: ChatParticipant::with_id("u1"),
        recipient: ChatParticipant::with_id("u2"),
        message: "hello".to_string(),
        message_type: "text".to_string(),
        created_on: "2024-03-07T10:00:00Z".to_string(),
        ..Default::default()
    }
}

fn bench_bus_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("bus_publish");
    let event = NotificationEvent::from(message());

    for listeners in [1usize, 8, 64] {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..listeners {
            let hits = Arc::clone(&hits);
            bus.add(&Listener::new(move |_: &ChatMessageReceivedEvent| {
                hits.fetch_add(1, Ordering::Relaxed);
            }));
        }

        group.bench_with_input(BenchmarkId::from_parameter(listeners), &listeners, |b, _| {
            b.iter(|| black_box(bus.publish(black_box(&event))))
        });
    }
    group.finish();
}

fn bench_transport_to_listener(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let transport = Arc::new(LoopbackTransport::new());
    let client = ChatClient::new(
        &LoopbackTransportFactory::new(Arc::clone(&transport)),
        Arc::new(StaticTokenCredential::new("bench")),
        &TransportOptions::default(),
    );
    runtime
        .block_on(client.start_realtime_notifications())
        .expect("start");
    client
        .on(&Listener::new(|e: &ChatMessageReceivedEvent| {
            black_box(e.message.len());
        }))
        .expect("subscribe");

    let raw = TransportEvent::ChatMessageReceived(message());
    c.bench_function("transport_raise_to_listener", |b| {
        b.iter(|| black_box(transport.raise(raw.clone())))
    });
}

criterion_group!(benches, bench_bus_publish, bench_transport_to_listener);
criterion_main!(benches);

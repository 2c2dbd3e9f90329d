//! Fan-out and flush benchmarks.
//!
//! Measures broadcast cost for growing subscriber counts and the cost of
//! flushing a cached queue on open, both over the in-memory transport.
//!
//! Run with: cargo bench --bench fanout
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cached_socket::{EventType, MemoryConnector, Socket, SocketOptions, Subscriber};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const SUBSCRIBER_COUNTS: &[usize] = &[1, 10, 100];
const QUEUE_LENGTHS: &[usize] = &[10, 100, 1000];

// ============================================================================
// Benchmark: Message Broadcast
// ============================================================================

fn bench_broadcast(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast");

    for &count in SUBSCRIBER_COUNTS {
        let connector = MemoryConnector::new();
        let handle = connector.handle();
        let socket = Socket::with_connector(SocketOptions::new("ws://bench"), connector)
            .expect("memory connect");

        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..count {
            let hits = Arc::clone(&hits);
            socket.register_callback(
                EventType::Message,
                &Subscriber::new(move |_, payload| {
                    black_box(payload);
                    hits.fetch_add(1, Ordering::Relaxed);
                }),
            );
        }

        group.bench_with_input(BenchmarkId::new("subscribers", count), &count, |b, _| {
            b.iter(|| handle.message(r#"{"name":"n2","seq":1}"#));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Queue Flush
// ============================================================================

fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush");

    for &len in QUEUE_LENGTHS {
        group.bench_with_input(BenchmarkId::new("queued", len), &len, |b, &len| {
            b.iter(|| {
                let connector = MemoryConnector::new();
                let handle = connector.handle();
                let socket = Socket::with_connector(SocketOptions::new("ws://bench"), connector)
                    .expect("memory connect");

                for i in 0..len {
                    socket.send(json!({ "seq": i }));
                }
                handle.open();
                black_box(handle.sent().len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_broadcast, bench_flush);
criterion_main!(benches);

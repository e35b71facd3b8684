use criterion::{Criterion, criterion_group, criterion_main};
use event_store::{
    AggregateId, EventEnvelope, EventStore, EventStoreExt, InMemoryEventStore, StreamAppend,
    StreamId, Version,
};

fn event(stream: &StreamId, version: i64) -> EventEnvelope {
    EventEnvelope::builder()
        .stream(stream.clone())
        .event_type("BenchEvent")
        .version(Version::new(version))
        .payload_raw(serde_json::json!({"quantity": 1}))
        .build()
        .unwrap()
}

fn bench_single_stream_append(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("event_store/append_single", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::new();
                let stream = StreamId::new("Product", AggregateId::new());
                store
                    .append(stream.clone(), Version::initial(), vec![event(&stream, 1)])
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_checkout_shaped_commit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    // One order, one cart and five product streams per commit.
    c.bench_function("event_store/commit_7_streams", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::new();
                let mut batch = Vec::new();
                for aggregate_type in ["Order", "Cart", "Product", "Product", "Product", "Product", "Product"] {
                    let stream = StreamId::new(aggregate_type, AggregateId::new());
                    batch.push(StreamAppend::new(stream.clone(), Version::initial(), vec![event(&stream, 1)]));
                }
                store.commit(batch).await.unwrap();
            });
        });
    });
}

fn bench_read_stream(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    let stream = StreamId::new("Order", AggregateId::new());

    rt.block_on(async {
        let events: Vec<EventEnvelope> = (1..=100).map(|v| event(&stream, v)).collect();
        store.append(stream.clone(), Version::initial(), events).await.unwrap();
    });

    c.bench_function("event_store/read_stream_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.read_stream(&stream).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_single_stream_append,
    bench_checkout_shaped_commit,
    bench_read_stream,
);
criterion_main!(benches);

//! Projection processor for feeding events to projections.

use event_store::{EventEnvelope, EventStore};
use futures_util::StreamExt;
use tokio::sync::Mutex;

use crate::Result;
use crate::projection::Projection;

/// Delivers events from an event store to registered projections.
///
/// - Catch-up: replays the global log from the last checkpoint
/// - Live delivery: forwards the envelopes a writer just committed
/// - Rebuild: resets every projection and replays from scratch
pub struct ProjectionProcessor<S: EventStore> {
    store: S,
    projections: Vec<Box<dyn Projection>>,
    /// Number of log entries catch-up has already delivered.
    checkpoint: Mutex<u64>,
}

impl<S: EventStore> ProjectionProcessor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            projections: Vec::new(),
            checkpoint: Mutex::new(0),
        }
    }

    pub fn register(&mut self, projection: Box<dyn Projection>) {
        self.projections.push(projection);
    }

    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Streams the log from the checkpoint and delivers every new event.
    #[tracing::instrument(skip(self))]
    pub async fn run_catch_up(&self) -> Result<()> {
        let mut checkpoint = self.checkpoint.lock().await;
        let mut stream = self.store.stream_all().await?;
        let mut index: u64 = 0;
        let mut delivered: u64 = 0;

        while let Some(result) = stream.next().await {
            let event = result?;
            index += 1;
            if index <= *checkpoint {
                continue;
            }
            self.deliver(&event).await?;
            delivered += 1;
            *checkpoint = index;
        }

        tracing::info!(delivered, checkpoint = *checkpoint, "catch-up complete");
        Ok(())
    }

    /// Delivers events a writer has just committed.
    #[tracing::instrument(skip(self, events), fields(events = events.len()))]
    pub async fn process_events(&self, events: &[EventEnvelope]) -> Result<()> {
        for event in events {
            self.deliver(event).await?;
        }
        Ok(())
    }

    /// Resets all projections and replays all events from the store.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<()> {
        for projection in &self.projections {
            projection.reset().await?;
        }
        *self.checkpoint.lock().await = 0;
        self.run_catch_up().await
    }

    async fn deliver(&self, event: &EventEnvelope) -> Result<()> {
        for projection in &self.projections {
            if projection.accepts(&event.aggregate_type) {
                projection.handle(event).await?;
                metrics::counter!("projections_events_processed", "projection" => projection.name())
                    .increment(1);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ProjectionPosition;
    use async_trait::async_trait;
    use common::AggregateId;
    use event_store::{EventStoreExt, InMemoryEventStore, StreamId, Version};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Counts the events it sees for one aggregate type.
    struct CountingProjection {
        subscriptions: &'static [&'static str],
        count: Arc<RwLock<u64>>,
        position: Arc<RwLock<ProjectionPosition>>,
    }

    impl CountingProjection {
        fn new(subscriptions: &'static [&'static str]) -> Self {
            Self {
                subscriptions,
                count: Arc::new(RwLock::new(0)),
                position: Arc::new(RwLock::new(ProjectionPosition::zero())),
            }
        }
    }

    #[async_trait]
    impl Projection for CountingProjection {
        fn name(&self) -> &'static str {
            "CountingProjection"
        }

        fn subscriptions(&self) -> &'static [&'static str] {
            self.subscriptions
        }

        async fn handle(&self, _event: &EventEnvelope) -> Result<()> {
            *self.count.write().await += 1;
            let mut pos = self.position.write().await;
            *pos = pos.advance();
            Ok(())
        }

        async fn position(&self) -> ProjectionPosition {
            *self.position.read().await
        }

        async fn reset(&self) -> Result<()> {
            *self.count.write().await = 0;
            *self.position.write().await = ProjectionPosition::zero();
            Ok(())
        }
    }

    fn event(stream: &StreamId, version: i64) -> EventEnvelope {
        EventEnvelope::builder()
            .stream(stream.clone())
            .event_type("TestEvent")
            .version(Version::new(version))
            .payload_raw(serde_json::json!({"test": true}))
            .build()
            .unwrap()
    }

    async fn seed(store: &InMemoryEventStore, aggregate_type: &str, count: i64) -> StreamId {
        let stream = StreamId::new(aggregate_type, AggregateId::new());
        let events = (1..=count).map(|v| event(&stream, v)).collect();
        store
            .append(stream.clone(), Version::initial(), events)
            .await
            .unwrap();
        stream
    }

    #[tokio::test]
    async fn catch_up_delivers_all_events() {
        let store = InMemoryEventStore::new();
        seed(&store, "Order", 3).await;

        let projection = CountingProjection::new(&["Order"]);
        let count = Arc::clone(&projection.count);
        let mut processor = ProjectionProcessor::new(store);
        processor.register(Box::new(projection));

        processor.run_catch_up().await.unwrap();
        assert_eq!(*count.read().await, 3);
    }

    #[tokio::test]
    async fn catch_up_resumes_from_checkpoint() {
        let store = InMemoryEventStore::new();
        seed(&store, "Order", 3).await;

        let projection = CountingProjection::new(&["Order"]);
        let count = Arc::clone(&projection.count);
        let mut processor = ProjectionProcessor::new(store.clone());
        processor.register(Box::new(projection));

        processor.run_catch_up().await.unwrap();
        processor.run_catch_up().await.unwrap();
        assert_eq!(*count.read().await, 3);

        seed(&store, "Order", 2).await;
        processor.run_catch_up().await.unwrap();
        assert_eq!(*count.read().await, 5);
    }

    #[tokio::test]
    async fn events_go_only_to_subscribers() {
        let store = InMemoryEventStore::new();
        seed(&store, "Order", 2).await;
        seed(&store, "Product", 3).await;

        let orders = CountingProjection::new(&["Order"]);
        let products = CountingProjection::new(&["Product"]);
        let order_count = Arc::clone(&orders.count);
        let product_count = Arc::clone(&products.count);

        let mut processor = ProjectionProcessor::new(store);
        processor.register(Box::new(orders));
        processor.register(Box::new(products));
        assert_eq!(processor.projection_count(), 2);

        processor.run_catch_up().await.unwrap();
        assert_eq!(*order_count.read().await, 2);
        assert_eq!(*product_count.read().await, 3);
    }

    #[tokio::test]
    async fn live_delivery_forwards_committed_events() {
        let store = InMemoryEventStore::new();
        let projection = CountingProjection::new(&["Cart"]);
        let count = Arc::clone(&projection.count);
        let mut processor = ProjectionProcessor::new(store);
        processor.register(Box::new(projection));

        let stream = StreamId::new("Cart", AggregateId::new());
        processor
            .process_events(&[event(&stream, 1), event(&stream, 2)])
            .await
            .unwrap();
        assert_eq!(*count.read().await, 2);
    }

    #[tokio::test]
    async fn rebuild_resets_and_replays() {
        let store = InMemoryEventStore::new();
        seed(&store, "Order", 2).await;

        let projection = CountingProjection::new(&["Order"]);
        let count = Arc::clone(&projection.count);
        let position = Arc::clone(&projection.position);
        let mut processor = ProjectionProcessor::new(store);
        processor.register(Box::new(projection));

        processor.run_catch_up().await.unwrap();
        processor.rebuild_all().await.unwrap();
        assert_eq!(*count.read().await, 2);
        assert_eq!(position.read().await.events_processed, 2);
    }

    #[tokio::test]
    async fn empty_store_catch_up() {
        let projection = CountingProjection::new(&["Order"]);
        let count = Arc::clone(&projection.count);
        let mut processor = ProjectionProcessor::new(InMemoryEventStore::new());
        processor.register(Box::new(projection));

        processor.run_catch_up().await.unwrap();
        assert_eq!(*count.read().await, 0);
    }
}

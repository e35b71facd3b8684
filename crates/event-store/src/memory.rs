use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    EventEnvelope, EventStoreError, Result, StreamId, Version,
    store::{EventStore, EventStream, StreamAppend, validate_batch},
};

#[derive(Default)]
struct MemoryState {
    /// Global log in commit order.
    log: Vec<EventEnvelope>,
    /// Current version per stream.
    heads: HashMap<StreamId, Version>,
    /// Number of upcoming commits that fail as if the pool timed out.
    injected_failures: u32,
}

/// In-memory event store.
///
/// The whole commit runs under one write lock, so a batch is checked and
/// applied without any other writer observing a partial result.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.state.read().await.log.len()
    }

    /// Makes the next `count` commits fail with a transient database error.
    pub async fn fail_next_commits(&self, count: u32) {
        self.state.write().await.injected_failures = count;
    }

    /// Clears all streams.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.log.clear();
        state.heads.clear();
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn commit(&self, batch: Vec<StreamAppend>) -> Result<Vec<EventEnvelope>> {
        validate_batch(&batch)?;

        let mut state = self.state.write().await;

        if state.injected_failures > 0 {
            state.injected_failures -= 1;
            return Err(EventStoreError::Database(sqlx::Error::PoolTimedOut));
        }

        for append in &batch {
            let actual = state
                .heads
                .get(&append.stream)
                .copied()
                .unwrap_or(Version::initial());
            if actual != append.expected_version {
                return Err(EventStoreError::ConcurrencyConflict {
                    stream: append.stream.clone(),
                    expected: append.expected_version,
                    actual,
                });
            }
        }

        let mut committed = Vec::new();
        for append in batch {
            if append.events.is_empty() {
                continue;
            }
            let head = append.resulting_version();
            state.heads.insert(append.stream, head);
            committed.extend(append.events);
        }
        state.log.extend(committed.iter().cloned());

        metrics::counter!("event_store_events_appended_total").increment(committed.len() as u64);
        Ok(committed)
    }

    async fn read_stream(&self, stream: &StreamId) -> Result<Vec<EventEnvelope>> {
        let state = self.state.read().await;
        Ok(state
            .log
            .iter()
            .filter(|e| e.belongs_to(stream))
            .cloned()
            .collect())
    }

    async fn stream_version(&self, stream: &StreamId) -> Result<Option<Version>> {
        Ok(self.state.read().await.heads.get(stream).copied())
    }

    async fn stream_all(&self) -> Result<EventStream> {
        use futures_util::stream;

        let events = self.state.read().await.log.clone();
        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }
}

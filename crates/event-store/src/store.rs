use std::collections::HashSet;
use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{EventEnvelope, EventStoreError, Result, StreamId, Version};

/// One stream's share of a commit.
///
/// `expected_version` is the version the writer observed when it read the
/// stream. An append with no events still takes part in the version check,
/// which lets a writer guard on data it read but did not change.
#[derive(Debug, Clone)]
pub struct StreamAppend {
    pub stream: StreamId,
    pub expected_version: Version,
    pub events: Vec<EventEnvelope>,
}

impl StreamAppend {
    pub fn new(stream: StreamId, expected_version: Version, events: Vec<EventEnvelope>) -> Self {
        Self {
            stream,
            expected_version,
            events,
        }
    }

    /// A read guard: no events, only the version check.
    pub fn guard(stream: StreamId, expected_version: Version) -> Self {
        Self::new(stream, expected_version, Vec::new())
    }

    /// Version the stream will be at once this append lands.
    pub fn resulting_version(&self) -> Version {
        self.events
            .last()
            .map(|e| e.version)
            .unwrap_or(self.expected_version)
    }
}

/// A stream of events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<EventEnvelope>> + Send>>;

/// Storage backend for event streams.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Atomically applies a batch of appends.
    ///
    /// Fails with `ConcurrencyConflict` and writes nothing if any stream is not
    /// at its expected version. Returns the appended events in commit order.
    async fn commit(&self, batch: Vec<StreamAppend>) -> Result<Vec<EventEnvelope>>;

    /// Events of one stream, oldest first.
    async fn read_stream(&self, stream: &StreamId) -> Result<Vec<EventEnvelope>>;

    /// Current version of a stream, or None if it has no events.
    async fn stream_version(&self, stream: &StreamId) -> Result<Option<Version>>;

    /// Every event in the store in commit order.
    async fn stream_all(&self) -> Result<EventStream>;
}

/// Convenience methods available on every [`EventStore`].
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Appends events to a single stream.
    async fn append(
        &self,
        stream: StreamId,
        expected_version: Version,
        events: Vec<EventEnvelope>,
    ) -> Result<Version> {
        let committed = self
            .commit(vec![StreamAppend::new(stream, expected_version, events)])
            .await?;
        Ok(committed
            .last()
            .map(|e| e.version)
            .unwrap_or(expected_version))
    }

    /// Returns true if the stream has at least one event.
    async fn stream_exists(&self, stream: &StreamId) -> Result<bool> {
        Ok(self.stream_version(stream).await?.is_some())
    }
}

impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Checks a batch before any backend touches storage.
///
/// A batch must be non-empty, name each stream once, and every stream's
/// events must belong to it and continue its expected version without gaps.
pub fn validate_batch(batch: &[StreamAppend]) -> Result<()> {
    if batch.is_empty() {
        return Err(EventStoreError::InvalidBatch(
            "cannot commit an empty batch".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(batch.len());
    for append in batch {
        if !seen.insert(&append.stream) {
            return Err(EventStoreError::InvalidBatch(format!(
                "stream {} appears more than once",
                append.stream
            )));
        }

        let mut expected = append.expected_version;
        for event in &append.events {
            if !event.belongs_to(&append.stream) {
                return Err(EventStoreError::InvalidBatch(format!(
                    "event {} does not belong to stream {}",
                    event.event_id, append.stream
                )));
            }
            expected = expected.next();
            if event.version != expected {
                return Err(EventStoreError::InvalidBatch(format!(
                    "stream {}: expected event version {}, got {}",
                    append.stream, expected, event.version
                )));
            }
        }
    }

    Ok(())
}

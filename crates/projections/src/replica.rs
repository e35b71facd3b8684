//! Per-stream aggregate replicas for read models.

use std::collections::{BTreeMap, HashMap};

use common::AggregateId;
use domain::Aggregate;
use event_store::{EventEnvelope, Version};

use crate::{ProjectionError, Result};

struct Replica<A: Aggregate> {
    current: A,
    /// Events that arrived ahead of a gap, keyed by their version.
    pending: BTreeMap<Version, A::Event>,
}

impl<A: Aggregate> Default for Replica<A> {
    fn default() -> Self {
        Self {
            current: A::default(),
            pending: BTreeMap::new(),
        }
    }
}

/// Aggregates of one type rebuilt from their streams.
///
/// Each stream is applied strictly in version order. An event that arrives
/// early waits until the gap before it is filled; an event at or below the
/// replica's version is a duplicate and is dropped.
pub struct StreamReplicas<A: Aggregate> {
    streams: HashMap<AggregateId, Replica<A>>,
}

impl<A: Aggregate> Default for StreamReplicas<A> {
    fn default() -> Self {
        Self {
            streams: HashMap::new(),
        }
    }
}

impl<A: Aggregate> StreamReplicas<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one envelope and returns the aggregate if it moved forward.
    pub fn apply(&mut self, envelope: &EventEnvelope) -> Result<Option<&A>> {
        let event: A::Event =
            serde_json::from_value(envelope.payload.clone()).map_err(|source| {
                ProjectionError::Decode {
                    stream: envelope.stream_id().to_string(),
                    event_type: envelope.event_type.clone(),
                    source,
                }
            })?;

        let replica = self.streams.entry(envelope.aggregate_id).or_default();
        let next = replica.current.version().next();

        if envelope.version < next {
            return Ok(None);
        }
        if envelope.version > next {
            tracing::debug!(
                stream = %envelope.stream_id(),
                version = %envelope.version,
                expected = %next,
                "event arrived ahead of its stream, holding"
            );
            replica.pending.insert(envelope.version, event);
            return Ok(None);
        }

        replica.current.apply(event);
        replica.current.set_version(envelope.version);
        while let Some(entry) = replica.pending.first_entry() {
            let version = *entry.key();
            if version <= replica.current.version() {
                entry.remove();
            } else if version == replica.current.version().next() {
                replica.current.apply(entry.remove());
                replica.current.set_version(version);
            } else {
                break;
            }
        }

        Ok(Some(&replica.current))
    }

    /// Returns the aggregate if its first event has been applied.
    pub fn get(&self, id: impl Into<AggregateId>) -> Option<&A> {
        self.streams
            .get(&id.into())
            .map(|r| &r.current)
            .filter(|a| a.id().is_some())
    }

    /// Every aggregate whose first event has been applied.
    pub fn iter(&self) -> impl Iterator<Item = &A> {
        self.streams
            .values()
            .map(|r| &r.current)
            .filter(|a| a.id().is_some())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.streams.clear();
    }
}

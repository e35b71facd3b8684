//! Multi-aggregate read-validate-write units.

use common::AggregateId;
use event_store::{EventEnvelope, EventStore, StreamAppend, StreamId, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

struct Tracked {
    stream: StreamId,
    expected: Version,
    events: Vec<EventEnvelope>,
}

/// Collects reads and writes across several aggregates and commits them
/// together.
///
/// Every stream the unit loads is checked at commit time against the version
/// it was read at, including streams that received no new events. A unit
/// therefore commits only if nothing it based its decisions on has moved;
/// otherwise the commit fails with a retryable conflict and nothing is
/// written.
///
/// ```ignore
/// let mut uow = UnitOfWork::new(&store);
/// let mut product: Product = uow.load(product_id).await?;
/// let events = product.decrement(2, Some(order_id))?;
/// uow.record(&mut product, events)?;
/// uow.commit().await?;
/// ```
pub struct UnitOfWork<'s, S: EventStore + ?Sized> {
    store: &'s S,
    tracked: Vec<Tracked>,
}

impl<'s, S: EventStore + ?Sized> UnitOfWork<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            tracked: Vec::new(),
        }
    }

    /// Loads an aggregate by replaying its stream.
    ///
    /// A stream with no events yields `A::default()` at version 0, and the
    /// unit still guards on it staying empty.
    pub async fn load<A>(&mut self, id: impl Into<AggregateId>) -> Result<A, DomainError>
    where
        A: Aggregate,
    {
        let stream = StreamId::new(A::aggregate_type(), id);
        let envelopes = self.store.read_stream(&stream).await?;

        let mut aggregate = A::default();
        for envelope in envelopes {
            let event: A::Event = serde_json::from_value(envelope.payload)?;
            aggregate.apply(event);
            aggregate.set_version(envelope.version);
        }

        self.track(stream, aggregate.version());
        Ok(aggregate)
    }

    /// Loads an aggregate, returning None if its stream has no events.
    pub async fn load_existing<A>(
        &mut self,
        id: impl Into<AggregateId>,
    ) -> Result<Option<A>, DomainError>
    where
        A: Aggregate,
    {
        let aggregate: A = self.load(id).await?;
        Ok(aggregate.id().is_some().then_some(aggregate))
    }

    /// Applies `events` to `aggregate` and stages them for commit.
    ///
    /// An aggregate that was never loaded is staged as a new stream expected
    /// at the version it currently reports.
    pub fn record<A>(&mut self, aggregate: &mut A, events: Vec<A::Event>) -> Result<(), DomainError>
    where
        A: Aggregate,
    {
        if events.is_empty() {
            return Ok(());
        }

        let base = aggregate.version();
        for event in &events {
            aggregate.apply(event.clone());
        }
        let id = aggregate
            .id()
            .ok_or(DomainError::UnidentifiedAggregate(A::aggregate_type()))?;
        let stream = StreamId::new(A::aggregate_type(), id);

        let mut version = base;
        let mut envelopes = Vec::with_capacity(events.len());
        for event in &events {
            version = version.next();
            envelopes.push(
                EventEnvelope::builder()
                    .stream(stream.clone())
                    .event_type(event.event_type())
                    .version(version)
                    .payload(event)?
                    .build()?,
            );
        }
        aggregate.set_version(version);

        let index = self.track(stream, base);
        self.tracked[index].events.extend(envelopes);
        Ok(())
    }

    /// Number of events staged so far.
    pub fn pending_events(&self) -> usize {
        self.tracked.iter().map(|t| t.events.len()).sum()
    }

    /// Commits every staged event, guarded by every stream read.
    ///
    /// A unit that staged nothing is a pure read and commits nothing.
    pub async fn commit(self) -> Result<Vec<EventEnvelope>, DomainError> {
        if self.pending_events() == 0 {
            return Ok(Vec::new());
        }

        let streams = self.tracked.len();
        let batch = self
            .tracked
            .into_iter()
            .map(|t| StreamAppend::new(t.stream, t.expected, t.events))
            .collect();

        let committed = self.store.commit(batch).await?;
        metrics::counter!("unit_of_work_commits_total").increment(1);
        tracing::debug!(streams, events = committed.len(), "unit of work committed");
        Ok(committed)
    }

    fn track(&mut self, stream: StreamId, version: Version) -> usize {
        match self.tracked.iter().position(|t| t.stream == stream) {
            Some(index) => index,
            None => {
                self.tracked.push(Tracked {
                    stream,
                    expected: version,
                    events: Vec::new(),
                });
                self.tracked.len() - 1
            }
        }
    }
}

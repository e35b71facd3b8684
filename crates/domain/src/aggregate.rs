//! Core aggregate and domain event traits.

use common::AggregateId;
use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events are facts that already happened. They are immutable and
/// named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name stored alongside the payload.
    fn event_type(&self) -> &'static str;
}

/// Trait for event-sourced aggregates.
///
/// An aggregate is rebuilt by replaying its stream, decides new events from
/// commands, and applies events to move its state forward.
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors its commands can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name; half of every stream key.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's stream id, or None before its first event.
    fn id(&self) -> Option<AggregateId>;

    /// Returns the version of the last applied event (0 for a fresh aggregate).
    fn version(&self) -> Version;

    /// Sets the aggregate version.
    fn set_version(&mut self, version: Version);

    /// Applies an event to the aggregate.
    ///
    /// Must be pure and deterministic and must not fail: events are facts.
    fn apply(&mut self, event: Self::Event);

    /// Applies multiple events in sequence.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}

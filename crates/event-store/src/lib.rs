//! Append-only event streams backing the storefront.
//!
//! Every entity (product, cart, order, ...) is one stream addressed by a
//! [`StreamId`]. Writers commit a batch of [`StreamAppend`]s at once: either
//! every stream in the batch is still at the version the writer read and all
//! events land, or nothing is written.

pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, StreamId, Version};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use store::{EventStore, EventStoreExt, EventStream, StreamAppend, validate_batch};

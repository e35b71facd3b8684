//! Projection error types.

use thiserror::Error;

/// Errors that can occur during projection processing.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Event store error: {0}")]
    EventStore(#[from] event_store::EventStoreError),

    /// A stored payload does not match the event type of its stream.
    #[error("Cannot decode {event_type} on {stream}: {source}")]
    Decode {
        stream: String,
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;

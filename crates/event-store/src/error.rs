use thiserror::Error;

use crate::{StreamId, Version};

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// A stream in the batch moved since it was read.
    #[error("Concurrency conflict on {stream}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        stream: StreamId,
        expected: Version,
        actual: Version,
    },

    /// The batch handed to `commit` is malformed.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// An envelope was built without a required field.
    #[error("Invalid envelope: missing {0}")]
    InvalidEnvelope(&'static str),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventStoreError {
    /// Returns true when re-running the whole read-validate-write may succeed.
    ///
    /// Conflicts and connection-level failures qualify; malformed batches and
    /// payload errors never do.
    pub fn is_retryable(&self) -> bool {
        match self {
            EventStoreError::ConcurrencyConflict { .. } => true,
            EventStoreError::Database(err) => is_transient(err),
            _ => false,
        }
    }
}

fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => true,
        // serialization_failure / deadlock_detected
        sqlx::Error::Database(db) => matches!(db.code().as_deref(), Some("40001" | "40P01")),
        _ => false,
    }
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use common::AggregateId;

    #[test]
    fn conflicts_and_pool_timeouts_are_retryable() {
        let conflict = EventStoreError::ConcurrencyConflict {
            stream: StreamId::new("Order", AggregateId::new()),
            expected: Version::first(),
            actual: Version::new(2),
        };
        assert!(conflict.is_retryable());
        assert!(EventStoreError::Database(sqlx::Error::PoolTimedOut).is_retryable());
    }

    #[test]
    fn malformed_input_is_not_retryable() {
        assert!(!EventStoreError::InvalidBatch("empty".into()).is_retryable());
        assert!(!EventStoreError::InvalidEnvelope("payload").is_retryable());
        assert!(!EventStoreError::Database(sqlx::Error::RowNotFound).is_retryable());
    }
}

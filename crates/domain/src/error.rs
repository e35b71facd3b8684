//! Domain error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::address::AddressError;
use crate::cart::CartError;
use crate::order::OrderError;
use crate::product::ProductError;
use crate::seller::SellerError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Seller(#[from] SellerError),

    /// Events were recorded against an aggregate that still has no id.
    #[error("Cannot record events for an unidentified {0}")]
    UnidentifiedAggregate(&'static str),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Returns true when re-running the whole unit of work may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::EventStore(e) if e.is_retryable())
    }
}

//! Service error taxonomy.

use domain::{
    AddressError, CartError, DomainError, OrderError, ProductError, SellerError,
};
use event_store::EventStoreError;
use projections::ProjectionError;
use thiserror::Error;

use crate::collaborators::BlobError;

/// Error categories every caller can rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    /// Absent, or not owned by the caller.
    NotFound,
    ValidationFailed,
    InvalidTransition,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ValidationFailed => "validation_failed",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Errors returned by storefront operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("Event store error: {0}")]
    Store(#[from] EventStoreError),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Unauthenticated => ErrorKind::Unauthenticated,
            ServiceError::Forbidden(_) => ErrorKind::Forbidden,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Validation(_) => ErrorKind::ValidationFailed,
            ServiceError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            ServiceError::Store(_) | ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Conflicts and transient store failures; the whole unit may be re-run.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Store(e) if e.is_retryable())
    }

    /// Message safe to show a client. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal Server Error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::EventStore(e) => ServiceError::Store(e),
            DomainError::Product(e) => e.into(),
            DomainError::Cart(e) => e.into(),
            DomainError::Order(e) => e.into(),
            DomainError::Address(e) => e.into(),
            DomainError::Seller(e) => e.into(),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<ProductError> for ServiceError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::AlreadyListed => ServiceError::Internal(err.to_string()),
            _ => ServiceError::Validation(err.to_string()),
        }
    }
}

impl From<CartError> for ServiceError {
    fn from(err: CartError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<OrderError> for ServiceError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotSellerOfOrder => ServiceError::Forbidden(err.to_string()),
            OrderError::InvalidTransition { .. } => ServiceError::InvalidTransition(err.to_string()),
            OrderError::NoItems | OrderError::AmountTooLarge => {
                ServiceError::Validation(err.to_string())
            }
            OrderError::AlreadyPlaced => ServiceError::Internal(err.to_string()),
        }
    }
}

impl From<AddressError> for ServiceError {
    fn from(err: AddressError) -> Self {
        ServiceError::NotFound(err.to_string())
    }
}

impl From<SellerError> for ServiceError {
    fn from(err: SellerError) -> Self {
        match err {
            SellerError::IncompleteApplication(_) => ServiceError::Validation(err.to_string()),
            SellerError::NotApplied => ServiceError::NotFound(err.to_string()),
            SellerError::NotApproved => ServiceError::Forbidden(err.to_string()),
        }
    }
}

impl From<BlobError> for ServiceError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::Empty => ServiceError::Validation(err.to_string()),
            BlobError::Upload(_) => ServiceError::Internal(err.to_string()),
        }
    }
}

impl From<ProjectionError> for ServiceError {
    fn from(err: ProjectionError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

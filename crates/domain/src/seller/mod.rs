//! Seller profile aggregate: onboarding and approval.

mod aggregate;
mod events;

pub use aggregate::{DocumentKind, SellerApplication, SellerDocuments, SellerProfile};
pub use events::{ApplicationSubmittedData, SellerApprovedData, SellerProfileEvent};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SellerError {
    /// An application field failed validation; the message names it.
    #[error("{0}")]
    IncompleteApplication(&'static str),

    #[error("Seller has not applied")]
    NotApplied,

    #[error("Not an approved seller")]
    NotApproved,
}

//! Storefront use cases on top of the event-sourced domain.
//!
//! Every operation takes the authenticated [`Principal`] explicitly, runs as
//! one [`domain::UnitOfWork`] under the [`RetryPolicy`], and feeds what it
//! committed to the read models before returning.
//!
//! - checkout: cart to order, with the configured [`StockPolicy`]
//! - fulfillment: seller accept / reject / dispatch and stock reconciliation
//! - cart, catalog and accounts (addresses, seller onboarding, buyer orders)
//! - collaborators: [`AuthProvider`] and [`BlobStore`] seams

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod collaborators;
pub mod error;
pub mod fulfillment;
pub mod orders;
pub mod retry;
pub mod storefront;

pub use accounts::NewAddress;
pub use cart::{CartSnapshot, CartSnapshotLine};
pub use catalog::ProductUpdate;
pub use checkout::{CheckoutRequest, StockPolicy};
pub use collaborators::{
    AuthProvider, BlobError, BlobStore, InMemoryAuthProvider, InMemoryBlobStore, Principal, Role,
    StoredBlob,
};
pub use error::{ErrorKind, Result, ServiceError};
pub use fulfillment::ActionOutcome;
pub use retry::RetryPolicy;
pub use storefront::Storefront;

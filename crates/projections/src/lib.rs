//! Read models for the storefront query side.
//!
//! - [`Projection`] trait for folding events into a read model
//! - [`ReadModel`] trait for query access to denormalized data
//! - [`ProjectionProcessor`] for feeding events from the store to projections
//! - [`StreamReplicas`] for rebuilding aggregates per stream in version order
//! - Three views: buyer orders, seller orders, seller catalog

pub mod error;
pub mod processor;
pub mod projection;
pub mod read_model;
pub mod replica;
pub mod views;

pub use error::{ProjectionError, Result};
pub use processor::ProjectionProcessor;
pub use projection::{Projection, ProjectionPosition};
pub use read_model::ReadModel;
pub use replica::StreamReplicas;
pub use views::{BuyerContact, BuyerOrdersView, CatalogView, SellerOrder, SellerOrdersView};

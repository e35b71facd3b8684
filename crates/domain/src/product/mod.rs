//! Product aggregate: catalog entry and inventory ledger for one product.

mod aggregate;
mod events;
mod sku;

pub use aggregate::{NewProduct, Product};
pub use events::{
    AvailabilityChangedData, PriceChangedData, ProductEvent, ProductListedData,
    StockMovementData, StockOverwrittenData,
};
pub use sku::{SkuClaim, SkuClaimedData, SkuEvent};

use thiserror::Error;

/// Errors raised by product commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("Product is already listed")]
    AlreadyListed,

    /// A listing field failed validation; the message names the field.
    #[error("{0}")]
    InvalidListing(&'static str),

    #[error("SKU already exists")]
    DuplicateSku,

    #[error("Valid price is required")]
    InvalidPrice { cents: i64 },

    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    #[error("\"{name}\" is no longer available")]
    Unavailable { name: String },

    #[error("Only {available} units left for \"{name}\"")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },
}

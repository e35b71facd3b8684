//! Cart aggregate: one buyer's pre-checkout selection.

mod aggregate;
mod events;

pub use aggregate::{Cart, CartLine};
pub use events::{CartClearedData, CartEvent, CartItemRemovedData, CartItemSetData};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Your cart is empty")]
    Empty,

    #[error("Quantity {0} is too large")]
    QuantityTooLarge(i64),
}

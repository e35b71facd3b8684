//! Order aggregate and related types.

mod aggregate;
mod events;
mod status;
mod value_objects;

pub use aggregate::{Order, PlaceOrder};
pub use events::{
    OrderEvent, OrderPlacedData, SellerAcceptedData, SellerDispatchedData, SellerRejectedData,
};
pub use status::{OrderStatus, SellerAction};
pub use value_objects::{
    OrderItem, OrderTotals, PaymentMethod, PaymentStatus, SellerFulfillment, ShippingMethod,
};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Order already placed")]
    AlreadyPlaced,

    #[error("Order has no items")]
    NoItems,

    /// A line or order total does not fit in the money range.
    #[error("Order total is too large")]
    AmountTooLarge,

    /// The acting seller has no items in the order.
    #[error("No items in this order belong to you")]
    NotSellerOfOrder,

    /// The seller's share is not in a state the action may fire from.
    #[error("{}", .action.refusal(.current))]
    InvalidTransition {
        action: SellerAction,
        current: OrderStatus,
    },
}

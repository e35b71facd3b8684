//! Identifier types shared by every storefront crate.

mod ids;

pub use ids::{AddressId, AggregateId, OrderId, ProductId, SellerId, UserId};

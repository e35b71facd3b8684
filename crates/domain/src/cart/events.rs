//! Cart domain events.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CartEvent {
    /// A line was added or its quantity replaced.
    ItemSet(CartItemSetData),

    ItemRemoved(CartItemRemovedData),

    /// Every line was dropped because the cart became an order.
    CartCleared(CartClearedData),
}

impl DomainEvent for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemSet(_) => "CartItemSet",
            CartEvent::ItemRemoved(_) => "CartItemRemoved",
            CartEvent::CartCleared(_) => "CartCleared",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemSetData {
    pub buyer_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub set_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemRemovedData {
    pub product_id: ProductId,
    pub removed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartClearedData {
    pub order_id: Option<OrderId>,
    pub cleared_at: DateTime<Utc>,
}

impl CartEvent {
    pub fn item_set(buyer_id: UserId, product_id: ProductId, quantity: u32) -> Self {
        CartEvent::ItemSet(CartItemSetData {
            buyer_id,
            product_id,
            quantity,
            set_at: Utc::now(),
        })
    }

    pub fn item_removed(product_id: ProductId) -> Self {
        CartEvent::ItemRemoved(CartItemRemovedData {
            product_id,
            removed_at: Utc::now(),
        })
    }

    pub fn cleared(order_id: Option<OrderId>) -> Self {
        CartEvent::CartCleared(CartClearedData {
            order_id,
            cleared_at: Utc::now(),
        })
    }
}

//! Product domain events.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, SellerId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::Money;

/// Events that can occur on a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    ProductListed(ProductListedData),

    /// Units left the ledger (checkout or seller accept).
    StockDecremented(StockMovementData),

    /// Units returned to the ledger (seller reject).
    StockIncremented(StockMovementData),

    /// The seller replaced the stock count outright.
    StockOverwritten(StockOverwrittenData),

    PriceChanged(PriceChangedData),

    AvailabilityChanged(AvailabilityChangedData),
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductListed(_) => "ProductListed",
            ProductEvent::StockDecremented(_) => "StockDecremented",
            ProductEvent::StockIncremented(_) => "StockIncremented",
            ProductEvent::StockOverwritten(_) => "StockOverwritten",
            ProductEvent::PriceChanged(_) => "PriceChanged",
            ProductEvent::AvailabilityChanged(_) => "AvailabilityChanged",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListedData {
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub price: Money,
    #[serde(default)]
    pub mrp: Option<Money>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub stock: u32,
    pub listed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovementData {
    pub quantity: u32,

    /// The order that caused the movement, if any.
    pub order_id: Option<OrderId>,

    /// Stock level once the movement is applied.
    pub stock_after: u32,

    pub moved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockOverwrittenData {
    pub previous: u32,
    pub stock: u32,
    pub overwritten_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceChangedData {
    pub previous: Money,
    pub price: Money,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityChangedData {
    pub available: bool,
    pub changed_at: DateTime<Utc>,
}

impl ProductEvent {
    pub fn stock_decremented(quantity: u32, order_id: Option<OrderId>, stock_after: u32) -> Self {
        ProductEvent::StockDecremented(StockMovementData {
            quantity,
            order_id,
            stock_after,
            moved_at: Utc::now(),
        })
    }

    pub fn stock_incremented(quantity: u32, order_id: Option<OrderId>, stock_after: u32) -> Self {
        ProductEvent::StockIncremented(StockMovementData {
            quantity,
            order_id,
            stock_after,
            moved_at: Utc::now(),
        })
    }

    pub fn stock_overwritten(previous: u32, stock: u32) -> Self {
        ProductEvent::StockOverwritten(StockOverwrittenData {
            previous,
            stock,
            overwritten_at: Utc::now(),
        })
    }

    pub fn price_changed(previous: Money, price: Money) -> Self {
        ProductEvent::PriceChanged(PriceChangedData {
            previous,
            price,
            changed_at: Utc::now(),
        })
    }

    pub fn availability_changed(available: bool) -> Self {
        ProductEvent::AvailabilityChanged(AvailabilityChangedData {
            available,
            changed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_serializes_with_tag() {
        let event = ProductEvent::stock_decremented(3, Some(OrderId::new()), 2);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StockDecremented");
        assert_eq!(json["data"]["quantity"], 3);
        assert_eq!(json["data"]["stock_after"], 2);

        let back: ProductEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.event_type(), "StockDecremented");
    }
}

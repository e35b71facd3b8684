//! Order domain events.

use chrono::{DateTime, Utc};
use common::{AddressId, OrderId, SellerId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{OrderItem, OrderTotals, PaymentMethod, PaymentStatus, ShippingMethod};

/// Events that can occur on an order aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// A cart was checked out into this order.
    OrderPlaced(OrderPlacedData),

    SellerAccepted(SellerAcceptedData),

    SellerRejected(SellerRejectedData),

    SellerDispatched(SellerDispatchedData),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "OrderPlaced",
            OrderEvent::SellerAccepted(_) => "SellerAccepted",
            OrderEvent::SellerRejected(_) => "SellerRejected",
            OrderEvent::SellerDispatched(_) => "SellerDispatched",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedData {
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub address_id: AddressId,
    pub items: Vec<OrderItem>,
    pub totals: OrderTotals,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub shipping_method: ShippingMethod,
    pub notes: Option<String>,

    /// Whether checkout already took the items out of stock.
    pub stock_reserved: bool,

    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerAcceptedData {
    pub seller_id: SellerId,

    /// Set when accepting is what took the seller's items out of stock.
    pub stock_decremented: bool,

    pub accepted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerRejectedData {
    pub seller_id: SellerId,

    /// Set when the rejection returned the seller's items to stock.
    pub stock_restored: bool,

    pub rejected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerDispatchedData {
    pub seller_id: SellerId,
    pub dispatched_at: DateTime<Utc>,
}

impl OrderEvent {
    pub fn seller_accepted(seller_id: SellerId, stock_decremented: bool) -> Self {
        OrderEvent::SellerAccepted(SellerAcceptedData {
            seller_id,
            stock_decremented,
            accepted_at: Utc::now(),
        })
    }

    pub fn seller_rejected(seller_id: SellerId, stock_restored: bool) -> Self {
        OrderEvent::SellerRejected(SellerRejectedData {
            seller_id,
            stock_restored,
            rejected_at: Utc::now(),
        })
    }

    pub fn seller_dispatched(seller_id: SellerId) -> Self {
        OrderEvent::SellerDispatched(SellerDispatchedData {
            seller_id,
            dispatched_at: Utc::now(),
        })
    }

    /// The seller an action event belongs to; None for placement.
    pub fn acting_seller(&self) -> Option<SellerId> {
        match self {
            OrderEvent::OrderPlaced(_) => None,
            OrderEvent::SellerAccepted(d) => Some(d.seller_id),
            OrderEvent::SellerRejected(d) => Some(d.seller_id),
            OrderEvent::SellerDispatched(d) => Some(d.seller_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types() {
        let seller = SellerId::new();
        assert_eq!(
            OrderEvent::seller_accepted(seller, false).event_type(),
            "SellerAccepted"
        );
        assert_eq!(
            OrderEvent::seller_rejected(seller, true).event_type(),
            "SellerRejected"
        );
        assert_eq!(
            OrderEvent::seller_dispatched(seller).event_type(),
            "SellerDispatched"
        );
    }

    #[test]
    fn rejected_round_trips_through_json() {
        let seller = SellerId::new();
        let json = serde_json::to_string(&OrderEvent::seller_rejected(seller, true)).unwrap();
        assert!(json.contains("SellerRejected"));

        let back: OrderEvent = serde_json::from_str(&json).unwrap();
        match back {
            OrderEvent::SellerRejected(data) => {
                assert_eq!(data.seller_id, seller);
                assert!(data.stock_restored);
            }
            other => panic!("expected SellerRejected, got {other:?}"),
        }
        assert_eq!(
            OrderEvent::seller_dispatched(seller).acting_seller(),
            Some(seller)
        );
    }
}

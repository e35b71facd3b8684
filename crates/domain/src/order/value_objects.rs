//! Value objects for the order domain.

use chrono::{DateTime, Utc};
use common::{ProductId, SellerId};
use serde::{Deserialize, Serialize};

use crate::value_objects::Money;

use super::{OrderError, OrderStatus};

/// Only cash on delivery is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        "cod"
    }

    pub fn parse(s: &str) -> Option<Self> {
        (s == "cod").then_some(PaymentMethod::CashOnDelivery)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    CodPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    #[default]
    Standard,
}

/// A placed order line. Price, seller and name are snapshots taken at
/// checkout and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub total_price: Money,
}

impl OrderItem {
    pub fn new(
        product_id: ProductId,
        seller_id: SellerId,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, OrderError> {
        let total_price = unit_price
            .checked_times(quantity)
            .ok_or(OrderError::AmountTooLarge)?;
        Ok(Self {
            product_id,
            seller_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
            total_price,
        })
    }
}

/// Monetary totals. Discount and shipping charge are always zero today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OrderTotals {
    pub total_amount: Money,
    pub discount: Money,
    pub shipping_charge: Money,
    pub final_amount: Money,
}

impl OrderTotals {
    pub fn for_items(items: &[OrderItem]) -> Result<Self, OrderError> {
        let total_amount = Money::checked_sum(items.iter().map(|i| i.total_price))
            .ok_or(OrderError::AmountTooLarge)?;
        let discount = Money::zero();
        let shipping_charge = Money::zero();
        let final_amount = total_amount
            .checked_sub(discount)
            .and_then(|m| m.checked_add(shipping_charge))
            .ok_or(OrderError::AmountTooLarge)?;
        Ok(Self {
            total_amount,
            discount,
            shipping_charge,
            final_amount,
        })
    }
}

/// One seller's share of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerFulfillment {
    pub seller_id: SellerId,
    pub status: OrderStatus,

    /// True while this seller's items are counted out of stock for the
    /// order. A rejection returns them only when this is set.
    pub stock_held: bool,

    pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl SellerFulfillment {
    pub fn new(seller_id: SellerId, stock_held: bool) -> Self {
        Self {
            seller_id,
            status: OrderStatus::Pending,
            stock_held,
            confirmed_at: None,
            shipped_at: None,
            cancelled_at: None,
        }
    }
}

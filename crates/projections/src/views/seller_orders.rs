//! Seller orders read model: orders containing a seller's items, grouped
//! per order, carrying only that seller's lines and the buyer's contact.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AddressId, OrderId, SellerId, UserId};
use domain::{
    Aggregate, BuyerProfile, Money, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
};
use event_store::EventEnvelope;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;
use crate::replica::StreamReplicas;

/// How a seller can reach the buyer of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerContact {
    /// First and last name, or "Customer" when the buyer gave neither.
    pub name: String,
    pub phone: Option<String>,
}

impl BuyerContact {
    pub fn of(profile: Option<&BuyerProfile>) -> Self {
        Self {
            name: profile
                .and_then(BuyerProfile::full_name)
                .unwrap_or_else(|| "Customer".to_string()),
            phone: profile.and_then(|p| p.phone()).map(str::to_string),
        }
    }
}

/// One order as a single seller sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerOrder {
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub buyer: BuyerContact,
    pub address_id: AddressId,

    /// The seller's own sub-status.
    pub status: OrderStatus,

    /// Status of the order as a whole.
    pub order_status: OrderStatus,

    /// The seller's lines only.
    pub items: Vec<OrderItem>,
    pub seller_total: Money,

    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub placed_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl SellerOrder {
    /// Projects `order` down to `seller`'s share, if they have one.
    pub fn of(order: &Order, seller: SellerId, buyer: Option<&BuyerProfile>) -> Option<Self> {
        let share = order.fulfillment(seller)?;
        let items: Vec<OrderItem> = order.items_of(seller).cloned().collect();
        Some(Self {
            order_id: order.order_id()?,
            buyer_id: order.buyer_id()?,
            buyer: BuyerContact::of(buyer),
            address_id: order.address_id()?,
            status: share.status,
            order_status: order.status(),
            // Bounded by the order total, which was checked at placement.
            seller_total: Money::checked_sum(items.iter().map(|i| i.total_price))?,
            items,
            payment_method: order.payment_method(),
            payment_status: order.payment_status(),
            notes: order.notes().map(str::to_string),
            placed_at: order.placed_at()?,
            confirmed_at: share.confirmed_at,
            shipped_at: share.shipped_at,
            cancelled_at: share.cancelled_at,
        })
    }
}

struct SellerOrdersState {
    orders: StreamReplicas<Order>,
    profiles: StreamReplicas<BuyerProfile>,
    by_seller: HashMap<SellerId, HashSet<OrderId>>,
    position: ProjectionPosition,
}

/// Read model view of orders per seller.
#[derive(Clone)]
pub struct SellerOrdersView {
    state: Arc<RwLock<SellerOrdersState>>,
}

impl SellerOrdersView {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SellerOrdersState {
                orders: StreamReplicas::new(),
                profiles: StreamReplicas::new(),
                by_seller: HashMap::new(),
                position: ProjectionPosition::zero(),
            })),
        }
    }

    /// Orders holding `seller`'s items, newest first.
    pub async fn orders_for(&self, seller: SellerId) -> Vec<SellerOrder> {
        let state = self.state.read().await;
        let mut orders: Vec<SellerOrder> = state
            .by_seller
            .get(&seller)
            .into_iter()
            .flatten()
            .filter_map(|id| state.orders.get(*id))
            .filter_map(|order| {
                let buyer = order.buyer_id().and_then(|b| state.profiles.get(b));
                SellerOrder::of(order, seller, buyer)
            })
            .collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        orders
    }

    /// Count of `seller`'s orders whose share is in `status`.
    pub async fn count_in(&self, seller: SellerId, status: OrderStatus) -> usize {
        self.orders_for(seller)
            .await
            .iter()
            .filter(|o| o.status == status)
            .count()
    }
}

impl Default for SellerOrdersView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Projection for SellerOrdersView {
    fn name(&self) -> &'static str {
        "SellerOrdersView"
    }

    fn subscriptions(&self) -> &'static [&'static str] {
        &["Order", "BuyerProfile"]
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let mut state = self.state.write().await;
        if event.aggregate_type == BuyerProfile::aggregate_type() {
            state.profiles.apply(event)?;
            state.position = state.position.advance();
            return Ok(());
        }

        let shares = state.orders.apply(event)?.and_then(|order| {
            let sellers: Vec<SellerId> = order.fulfillments().iter().map(|f| f.seller_id).collect();
            Some((order.order_id()?, sellers))
        });
        if let Some((order_id, sellers)) = shares {
            for seller in sellers {
                state.by_seller.entry(seller).or_default().insert(order_id);
            }
        }
        state.position = state.position.advance();
        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        self.state.read().await.position
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.orders.clear();
        state.profiles.clear();
        state.by_seller.clear();
        state.position = ProjectionPosition::zero();
        Ok(())
    }
}

impl ReadModel for SellerOrdersView {
    fn name(&self) -> &'static str {
        "SellerOrdersView"
    }

    fn count(&self) -> usize {
        self.state
            .try_read()
            .map(|s| s.orders.len())
            .unwrap_or(0)
    }
}

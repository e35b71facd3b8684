//! Buyer orders read model: every order a buyer has placed, newest first.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::Order;
use event_store::EventEnvelope;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;
use crate::replica::StreamReplicas;

struct BuyerOrdersState {
    orders: StreamReplicas<Order>,
    by_buyer: HashMap<UserId, HashSet<OrderId>>,
    position: ProjectionPosition,
}

/// Read model view of orders per buyer.
#[derive(Clone)]
pub struct BuyerOrdersView {
    state: Arc<RwLock<BuyerOrdersState>>,
}

impl BuyerOrdersView {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(BuyerOrdersState {
                orders: StreamReplicas::new(),
                by_buyer: HashMap::new(),
                position: ProjectionPosition::zero(),
            })),
        }
    }

    /// The buyer's orders, newest first.
    pub async fn orders_for(&self, buyer: UserId) -> Vec<Order> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .by_buyer
            .get(&buyer)
            .into_iter()
            .flatten()
            .filter_map(|id| state.orders.get(*id).cloned())
            .collect();
        orders.sort_by(|a, b| b.placed_at().cmp(&a.placed_at()));
        orders
    }

    /// One order, only if `buyer` placed it.
    pub async fn order_for(&self, buyer: UserId, order_id: OrderId) -> Option<Order> {
        let state = self.state.read().await;
        state
            .orders
            .get(order_id)
            .filter(|o| o.buyer_id() == Some(buyer))
            .cloned()
    }
}

impl Default for BuyerOrdersView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Projection for BuyerOrdersView {
    fn name(&self) -> &'static str {
        "BuyerOrdersView"
    }

    fn subscriptions(&self) -> &'static [&'static str] {
        &["Order"]
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let mut state = self.state.write().await;
        let placed = state
            .orders
            .apply(event)?
            .and_then(|order| Some((order.buyer_id()?, order.order_id()?)));
        if let Some((buyer, order_id)) = placed {
            state.by_buyer.entry(buyer).or_default().insert(order_id);
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
        state.by_buyer.clear();
        state.position = ProjectionPosition::zero();
        Ok(())
    }
}

impl ReadModel for BuyerOrdersView {
    fn name(&self) -> &'static str {
        "BuyerOrdersView"
    }

    fn count(&self) -> usize {
        self.state
            .try_read()
            .map(|s| s.orders.len())
            .unwrap_or(0)
    }
}

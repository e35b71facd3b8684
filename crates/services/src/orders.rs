//! The buyer's view of their own orders.

use common::OrderId;
use domain::Order;
use event_store::EventStore;

use crate::collaborators::Principal;
use crate::error::{Result, ServiceError};
use crate::storefront::Storefront;

impl<S: EventStore + Clone + 'static> Storefront<S> {
    /// The caller's orders, newest first.
    #[tracing::instrument(skip(self), fields(buyer = %principal.user_id))]
    pub async fn buyer_orders(&self, principal: Principal) -> Result<Vec<Order>> {
        Ok(self.buyer_orders.orders_for(principal.user_id).await)
    }

    /// One of the caller's orders. Someone else's order is reported as
    /// missing.
    #[tracing::instrument(skip(self), fields(buyer = %principal.user_id))]
    pub async fn buyer_order(&self, principal: Principal, order_id: OrderId) -> Result<Order> {
        self.buyer_orders
            .order_for(principal.user_id, order_id)
            .await
            .ok_or_else(|| ServiceError::not_found("Order not found"))
    }
}

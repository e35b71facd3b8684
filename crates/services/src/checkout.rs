//! Checkout: turns a buyer's cart into a pending order in one unit of work.

use std::time::Instant;

use common::{AddressId, OrderId};
use domain::{
    AddressBook, AddressError, Cart, CartError, Order, OrderItem, PaymentMethod, PlaceOrder,
    Product, UnitOfWork,
};
use event_store::{EventEnvelope, EventStore};
use serde::{Deserialize, Serialize};

use crate::collaborators::Principal;
use crate::error::{Result, ServiceError};
use crate::storefront::Storefront;

/// When an order's items leave the inventory ledger.
///
/// Whichever policy is active, each order records whether stock is held for
/// each seller's share, so every decrement has exactly one matching
/// increment on rejection even if the policy changes between deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Checkout decrements stock for every line; rejection restores it.
    #[default]
    ReserveAtCheckout,

    /// Checkout only validates; a seller's accept decrements their lines.
    DecrementOnAccept,
}

impl StockPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockPolicy::ReserveAtCheckout => "reserve_at_checkout",
            StockPolicy::DecrementOnAccept => "decrement_on_accept",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reserve_at_checkout" => Some(StockPolicy::ReserveAtCheckout),
            "decrement_on_accept" => Some(StockPolicy::DecrementOnAccept),
            _ => None,
        }
    }
}

impl std::fmt::Display for StockPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checkout input as the buyer submitted it.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub address_id: Option<AddressId>,
    pub payment_method: String,
    pub notes: Option<String>,
}

impl<S: EventStore + Clone + 'static> Storefront<S> {
    /// Places an order from the buyer's cart.
    ///
    /// Checks, first failure wins: delivery address given and owned, cash on
    /// delivery, cart not empty, every line available and in stock. The
    /// order, any stock movement and the emptied cart commit together.
    #[tracing::instrument(skip(self, request), fields(buyer = %principal.user_id))]
    pub async fn checkout(&self, principal: Principal, request: CheckoutRequest) -> Result<Order> {
        let started = Instant::now();
        let result = self
            .execute("checkout", || self.try_checkout(principal, &request))
            .await;

        let outcome = match &result {
            Ok(_) => "placed",
            Err(err) => err.kind().code(),
        };
        metrics::counter!("checkouts_total", "outcome" => outcome).increment(1);
        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());

        let order = result?;
        tracing::info!(
            order_id = ?order.order_id(),
            items = order.items().len(),
            final_amount = %order.totals().final_amount,
            stock_policy = %self.stock_policy,
            "order placed"
        );
        Ok(order)
    }

    async fn try_checkout(
        &self,
        principal: Principal,
        request: &CheckoutRequest,
    ) -> Result<(Order, Vec<EventEnvelope>)> {
        let buyer = principal.user_id;
        let address_id = request
            .address_id
            .ok_or_else(|| ServiceError::validation("Please select a delivery address"))?;

        let mut uow = UnitOfWork::new(&self.store);
        let addresses: AddressBook = uow.load(buyer).await?;
        if !addresses.contains(address_id) {
            return Err(AddressError::NotFound.into());
        }

        if PaymentMethod::parse(&request.payment_method).is_none() {
            return Err(ServiceError::validation(
                "Only Cash on Delivery is available at the moment",
            ));
        }

        let mut cart: Cart = uow.load(buyer).await?;
        if cart.is_empty() {
            return Err(CartError::Empty.into());
        }

        let order_id = OrderId::new();
        let take_stock = self.stock_policy == StockPolicy::ReserveAtCheckout;
        let mut items = Vec::with_capacity(cart.lines().len());

        for line in cart.lines().to_vec() {
            let mut product: Product = uow
                .load_existing(line.product_id)
                .await?
                .ok_or_else(|| ServiceError::validation("Product not found for cart item"))?;
            product.reserve(line.quantity)?;

            let seller_id = product
                .seller_id()
                .ok_or_else(|| ServiceError::Internal(format!("product {} has no seller", line.product_id)))?;
            items.push(OrderItem::new(
                line.product_id,
                seller_id,
                product.name(),
                line.quantity,
                product.price(),
            )?);

            if take_stock {
                let events = product.decrement(line.quantity, Some(order_id))?;
                uow.record(&mut product, events)?;
            }
        }

        let lines = items.len() as u64;
        let mut order = Order::default();
        let events = order.place(
            order_id,
            PlaceOrder {
                buyer_id: buyer,
                address_id,
                items,
                notes: request.notes.clone(),
                stock_reserved: take_stock,
            },
        )?;
        uow.record(&mut order, events)?;

        let events = cart.clear(order_id)?;
        uow.record(&mut cart, events)?;

        let committed = uow.commit().await?;
        if take_stock {
            metrics::counter!("stock_movements_total", "direction" => "decrement").increment(lines);
        }
        Ok((order, committed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_policy_names() {
        assert_eq!(StockPolicy::default(), StockPolicy::ReserveAtCheckout);
        assert_eq!(
            StockPolicy::parse(" Decrement_On_Accept "),
            Some(StockPolicy::DecrementOnAccept)
        );
        assert_eq!(StockPolicy::parse("lazy"), None);
        assert_eq!(StockPolicy::ReserveAtCheckout.to_string(), "reserve_at_checkout");
    }
}

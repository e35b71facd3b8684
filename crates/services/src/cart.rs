//! The buyer's cart, read back with live catalog data.

use common::{ProductId, SellerId};
use domain::{Cart, Money, Product, UnitOfWork};
use event_store::{EventEnvelope, EventStore};

use crate::collaborators::Principal;
use crate::error::{Result, ServiceError};
use crate::storefront::Storefront;

/// One cart line priced at the product's current list price.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshotLine {
    pub product_id: ProductId,
    pub seller_id: Option<SellerId>,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
    pub is_available: bool,
    pub stock: u32,
}

/// The cart as the buyer sees it. Prices are not locked until checkout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSnapshot {
    pub lines: Vec<CartSnapshotLine>,
    pub total: Money,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<S: EventStore + Clone + 'static> Storefront<S> {
    #[tracing::instrument(skip(self), fields(buyer = %principal.user_id))]
    pub async fn cart(&self, principal: Principal) -> Result<CartSnapshot> {
        let cart: Cart = self.read(principal.user_id).await?;
        self.snapshot(&cart).await
    }

    /// Sets the quantity of one product in the caller's cart. Zero or less
    /// removes the line.
    #[tracing::instrument(skip(self), fields(buyer = %principal.user_id))]
    pub async fn set_cart_item(
        &self,
        principal: Principal,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartSnapshot> {
        let cart = self
            .execute("set_cart_item", || {
                self.try_set_cart_item(principal, product_id, quantity)
            })
            .await?;
        self.snapshot(&cart).await
    }

    async fn try_set_cart_item(
        &self,
        principal: Principal,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(Cart, Vec<EventEnvelope>)> {
        let mut uow = UnitOfWork::new(&self.store);
        if quantity > 0 {
            let product = uow
                .load_existing::<Product>(product_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Product not found"))?;
            // Quantities beyond u32 are refused by the cart itself.
            if let Ok(q) = u32::try_from(quantity) {
                if product.price().checked_times(q).is_none() {
                    return Err(ServiceError::validation("Cart total is too large"));
                }
            }
        }

        let mut cart: Cart = uow.load(principal.user_id).await?;
        let events = cart.add_or_update(principal.user_id, product_id, quantity)?;
        uow.record(&mut cart, events)?;

        let committed = uow.commit().await?;
        Ok((cart, committed))
    }

    async fn snapshot(&self, cart: &Cart) -> Result<CartSnapshot> {
        let mut snapshot = CartSnapshot::default();
        for line in cart.lines() {
            // A line whose product vanished is dropped from the view;
            // checkout reports it.
            let product: Product = self.read(line.product_id).await?;
            if product.product_id().is_none() {
                continue;
            }
            let too_large = || ServiceError::validation("Cart total is too large");
            let line_total = product
                .price()
                .checked_times(line.quantity)
                .ok_or_else(too_large)?;
            snapshot.total = snapshot.total.checked_add(line_total).ok_or_else(too_large)?;
            snapshot.lines.push(CartSnapshotLine {
                product_id: line.product_id,
                seller_id: product.seller_id(),
                name: product.name().to_string(),
                quantity: line.quantity,
                unit_price: product.price(),
                line_total,
                is_available: product.is_available(),
                stock: product.stock(),
            });
        }
        Ok(snapshot)
    }
}

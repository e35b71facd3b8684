//! Seller fulfillment: listing a seller's orders and driving their share of
//! each order through accept, reject and dispatch.

use common::{OrderId, SellerId};
use domain::{Order, Product, SellerAction, UnitOfWork};
use event_store::{EventEnvelope, EventStore};
use projections::SellerOrder;

use crate::accounts::approved_seller;
use crate::collaborators::Principal;
use crate::error::{Result, ServiceError};
use crate::storefront::Storefront;

/// Result of a seller action, with the message shown to the seller.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub order: Order,
    pub action: SellerAction,
    pub message: &'static str,
}

impl<S: EventStore + Clone + 'static> Storefront<S> {
    /// Orders holding the caller's items, newest first, each carrying only
    /// the caller's lines.
    #[tracing::instrument(skip(self), fields(user = %principal.user_id))]
    pub async fn seller_orders(&self, principal: Principal) -> Result<Vec<SellerOrder>> {
        let mut uow = UnitOfWork::new(&self.store);
        let seller = approved_seller(&mut uow, principal).await?;
        Ok(self.seller_orders.orders_for(seller).await)
    }

    /// Applies `action` to the caller's share of `order_id`.
    ///
    /// Accepting takes the seller's items out of stock when the stock policy
    /// defers that to acceptance. Rejecting returns them when they are held.
    #[tracing::instrument(skip(self), fields(user = %principal.user_id))]
    pub async fn apply_seller_action(
        &self,
        principal: Principal,
        order_id: OrderId,
        action: SellerAction,
    ) -> Result<ActionOutcome> {
        let (order, restored) = self
            .execute("seller_action", || {
                self.try_seller_action(principal, order_id, action)
            })
            .await?;

        metrics::counter!("order_transitions_total", "action" => action.as_str()).increment(1);
        tracing::info!(
            %order_id,
            action = action.as_str(),
            order_status = %order.status(),
            restored,
            "seller action applied"
        );

        let message = match action {
            SellerAction::Accept => "Order accepted successfully",
            SellerAction::Dispatch => "Order dispatched successfully",
            SellerAction::Reject if restored => "Order rejected and stock restored",
            SellerAction::Reject => "Order rejected",
        };
        Ok(ActionOutcome {
            order,
            action,
            message,
        })
    }

    async fn try_seller_action(
        &self,
        principal: Principal,
        order_id: OrderId,
        action: SellerAction,
    ) -> Result<((Order, bool), Vec<EventEnvelope>)> {
        let mut uow = UnitOfWork::new(&self.store);
        let seller = approved_seller(&mut uow, principal).await?;

        let mut order: Order = uow
            .load_existing(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order not found"))?;
        let held = order.guard(seller, action)?.stock_held;

        let mut restored = false;
        let events = match action {
            SellerAction::Accept => {
                let take = self.stock_policy == crate::StockPolicy::DecrementOnAccept && !held;
                if take {
                    move_stock(&mut uow, &order, seller, Movement::Decrement).await?;
                }
                order.accept(seller, take)?
            }
            SellerAction::Reject => {
                if held {
                    move_stock(&mut uow, &order, seller, Movement::Increment).await?;
                    restored = true;
                }
                order.reject(seller)?
            }
            SellerAction::Dispatch => order.dispatch(seller)?,
        };
        uow.record(&mut order, events)?;

        let committed = uow.commit().await?;
        Ok(((order, restored), committed))
    }
}

#[derive(Debug, Clone, Copy)]
enum Movement {
    Decrement,
    Increment,
}

impl Movement {
    fn as_str(&self) -> &'static str {
        match self {
            Movement::Decrement => "decrement",
            Movement::Increment => "increment",
        }
    }
}

/// Moves stock for every line of `seller`'s share of `order`.
async fn move_stock<S: EventStore + ?Sized>(
    uow: &mut UnitOfWork<'_, S>,
    order: &Order,
    seller: SellerId,
    movement: Movement,
) -> Result<()> {
    let order_id = order.order_id();
    let lines: Vec<_> = order.items_of(seller).cloned().collect();
    for item in &lines {
        let mut product: Product = uow.load(item.product_id).await?;
        let events = match movement {
            Movement::Decrement => product.decrement(item.quantity, order_id)?,
            Movement::Increment => product.increment(item.quantity, order_id),
        };
        uow.record(&mut product, events)?;
    }
    metrics::counter!("stock_movements_total", "direction" => movement.as_str())
        .increment(lines.len() as u64);
    Ok(())
}

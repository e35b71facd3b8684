//! Cart aggregate implementation.

use common::{AggregateId, OrderId, ProductId, UserId};
use event_store::Version;

use crate::aggregate::Aggregate;

use super::{CartError, CartEvent};

/// One product and the quantity the buyer wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A buyer's cart, keyed by the buyer's user id.
///
/// Lines keep insertion order and hold at most one entry per product.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    buyer_id: Option<UserId>,
    version: Version,
    lines: Vec<CartLine>,
}

impl Aggregate for Cart {
    type Event = CartEvent;
    type Error = CartError;

    fn aggregate_type() -> &'static str {
        "Cart"
    }

    fn id(&self) -> Option<AggregateId> {
        self.buyer_id.map(AggregateId::from)
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            CartEvent::ItemSet(data) => {
                self.buyer_id.get_or_insert(data.buyer_id);
                match self.line_mut(data.product_id) {
                    Some(line) => line.quantity = data.quantity,
                    None => self.lines.push(CartLine {
                        product_id: data.product_id,
                        quantity: data.quantity,
                    }),
                }
            }
            CartEvent::ItemRemoved(data) => {
                self.lines.retain(|l| l.product_id != data.product_id);
            }
            CartEvent::CartCleared(_) => self.lines.clear(),
        }
    }
}

impl Cart {
    pub fn buyer_id(&self) -> Option<UserId> {
        self.buyer_id
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.quantity)
    }

    /// Sets the quantity of a product. A quantity of zero or less removes
    /// the line. Availability is not checked until checkout.
    pub fn add_or_update(
        &self,
        buyer_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Vec<CartEvent>, CartError> {
        let current = self.quantity_of(product_id);

        if quantity <= 0 {
            return Ok(match current {
                Some(_) => vec![CartEvent::item_removed(product_id)],
                None => vec![],
            });
        }

        let quantity = u32::try_from(quantity).map_err(|_| CartError::QuantityTooLarge(quantity))?;
        if current == Some(quantity) {
            return Ok(vec![]);
        }
        Ok(vec![CartEvent::item_set(buyer_id, product_id, quantity)])
    }

    /// Empties the cart once `order_id` has been placed from it.
    pub fn clear(&self, order_id: OrderId) -> Result<Vec<CartEvent>, CartError> {
        if self.is_empty() {
            return Err(CartError::Empty);
        }
        Ok(vec![CartEvent::cleared(Some(order_id))])
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }
}

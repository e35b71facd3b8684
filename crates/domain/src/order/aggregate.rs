//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AddressId, AggregateId, OrderId, SellerId, UserId};
use event_store::Version;

use crate::aggregate::Aggregate;

use super::{
    OrderError, OrderEvent, OrderItem, OrderStatus, OrderTotals, PaymentMethod, PaymentStatus,
    SellerAction, SellerFulfillment, ShippingMethod, events::OrderPlacedData,
};

/// Input for placing an order from a checked-out cart.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub buyer_id: UserId,
    pub address_id: AddressId,
    pub items: Vec<OrderItem>,
    pub notes: Option<String>,
    pub stock_reserved: bool,
}

/// Order aggregate root.
///
/// Line items are fixed at placement. Each seller present in the items owns
/// a [`SellerFulfillment`] that moves through the status machine on its own;
/// the order's status is always [`OrderStatus::derive`] over those shares.
#[derive(Debug, Clone, Default)]
pub struct Order {
    id: Option<OrderId>,
    version: Version,
    buyer_id: Option<UserId>,
    address_id: Option<AddressId>,
    items: Vec<OrderItem>,
    fulfillments: Vec<SellerFulfillment>,
    status: OrderStatus,
    totals: OrderTotals,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    shipping_method: ShippingMethod,
    notes: Option<String>,
    placed_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    confirmed_at: Option<DateTime<Utc>>,
    shipped_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl Aggregate for Order {
    type Event = OrderEvent;
    type Error = OrderError;

    fn aggregate_type() -> &'static str {
        "Order"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id.map(AggregateId::from)
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            OrderEvent::OrderPlaced(data) => self.apply_placed(data),
            OrderEvent::SellerAccepted(data) => {
                let at = data.accepted_at;
                if let Some(share) = self.fulfillment_mut(data.seller_id) {
                    share.status = OrderStatus::Confirmed;
                    share.confirmed_at = Some(at);
                    share.stock_held |= data.stock_decremented;
                }
                self.refresh_status(at);
            }
            OrderEvent::SellerRejected(data) => {
                let at = data.rejected_at;
                if let Some(share) = self.fulfillment_mut(data.seller_id) {
                    share.status = OrderStatus::Cancelled;
                    share.cancelled_at = Some(at);
                    if data.stock_restored {
                        share.stock_held = false;
                    }
                }
                self.refresh_status(at);
            }
            OrderEvent::SellerDispatched(data) => {
                let at = data.dispatched_at;
                if let Some(share) = self.fulfillment_mut(data.seller_id) {
                    share.status = OrderStatus::Shipped;
                    share.shipped_at = Some(at);
                }
                self.refresh_status(at);
            }
        }
    }
}

// Query methods
impl Order {
    pub fn order_id(&self) -> Option<OrderId> {
        self.id
    }

    pub fn buyer_id(&self) -> Option<UserId> {
        self.buyer_id
    }

    pub fn address_id(&self) -> Option<AddressId> {
        self.address_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Items sold by `seller`, in placement order.
    pub fn items_of(&self, seller: SellerId) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(move |i| i.seller_id == seller)
    }

    pub fn fulfillments(&self) -> &[SellerFulfillment] {
        &self.fulfillments
    }

    pub fn fulfillment(&self, seller: SellerId) -> Option<&SellerFulfillment> {
        self.fulfillments.iter().find(|f| f.seller_id == seller)
    }

    pub fn totals(&self) -> OrderTotals {
        self.totals
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn shipping_method(&self) -> ShippingMethod {
        self.shipping_method
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.placed_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }
}

// Command methods (return events)
impl Order {
    /// Places a new order. Prices, sellers and names in `input.items` are
    /// taken as the snapshot.
    pub fn place(&self, order_id: OrderId, input: PlaceOrder) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_some() {
            return Err(OrderError::AlreadyPlaced);
        }
        if input.items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let totals = OrderTotals::for_items(&input.items)?;
        Ok(vec![OrderEvent::OrderPlaced(OrderPlacedData {
            order_id,
            buyer_id: input.buyer_id,
            address_id: input.address_id,
            items: input.items,
            totals,
            payment_method: PaymentMethod::CashOnDelivery,
            payment_status: PaymentStatus::CodPending,
            shipping_method: ShippingMethod::Standard,
            notes: input.notes.filter(|n| !n.trim().is_empty()),
            stock_reserved: input.stock_reserved,
            placed_at: Utc::now(),
        })])
    }

    /// Checks that `seller` may perform `action` now and returns their share.
    pub fn guard(
        &self,
        seller: SellerId,
        action: SellerAction,
    ) -> Result<&SellerFulfillment, OrderError> {
        let share = self
            .fulfillment(seller)
            .ok_or(OrderError::NotSellerOfOrder)?;
        if !action.allowed_from(share.status) {
            return Err(OrderError::InvalidTransition {
                action,
                current: share.status,
            });
        }
        Ok(share)
    }

    /// Seller confirms their share. `decrement_stock` records that this
    /// acceptance is what takes the seller's items out of stock.
    pub fn accept(
        &self,
        seller: SellerId,
        decrement_stock: bool,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let share = self.guard(seller, SellerAction::Accept)?;
        Ok(vec![OrderEvent::seller_accepted(
            seller,
            decrement_stock && !share.stock_held,
        )])
    }

    /// Seller cancels their share. Stock is returned exactly when it is
    /// currently held for this seller.
    pub fn reject(&self, seller: SellerId) -> Result<Vec<OrderEvent>, OrderError> {
        let share = self.guard(seller, SellerAction::Reject)?;
        Ok(vec![OrderEvent::seller_rejected(seller, share.stock_held)])
    }

    /// Seller ships their share.
    pub fn dispatch(&self, seller: SellerId) -> Result<Vec<OrderEvent>, OrderError> {
        self.guard(seller, SellerAction::Dispatch)?;
        Ok(vec![OrderEvent::seller_dispatched(seller)])
    }
}

// Apply event helpers
impl Order {
    fn apply_placed(&mut self, data: OrderPlacedData) {
        let mut fulfillments: Vec<SellerFulfillment> = Vec::new();
        for item in &data.items {
            if !fulfillments.iter().any(|f| f.seller_id == item.seller_id) {
                fulfillments.push(SellerFulfillment::new(item.seller_id, data.stock_reserved));
            }
        }

        self.id = Some(data.order_id);
        self.buyer_id = Some(data.buyer_id);
        self.address_id = Some(data.address_id);
        self.items = data.items;
        self.fulfillments = fulfillments;
        self.status = OrderStatus::Pending;
        self.totals = data.totals;
        self.payment_method = data.payment_method;
        self.payment_status = data.payment_status;
        self.shipping_method = data.shipping_method;
        self.notes = data.notes;
        self.placed_at = Some(data.placed_at);
        self.updated_at = Some(data.placed_at);
    }

    fn fulfillment_mut(&mut self, seller: SellerId) -> Option<&mut SellerFulfillment> {
        self.fulfillments.iter_mut().find(|f| f.seller_id == seller)
    }

    fn refresh_status(&mut self, at: DateTime<Utc>) {
        let status = OrderStatus::derive(self.fulfillments.iter().map(|f| f.status));
        if status != self.status {
            let stamp = match status {
                OrderStatus::Confirmed => Some(&mut self.confirmed_at),
                OrderStatus::Shipped => Some(&mut self.shipped_at),
                OrderStatus::Cancelled => Some(&mut self.cancelled_at),
                OrderStatus::Pending => None,
            };
            if let Some(stamp) = stamp {
                stamp.get_or_insert(at);
            }
            self.status = status;
        }
        self.updated_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Money;
    use common::ProductId;

    fn item(seller: SellerId, quantity: u32, cents: i64) -> OrderItem {
        OrderItem::new(ProductId::new(), seller, "Saree", quantity, Money::from_cents(cents)).unwrap()
    }

    fn placed(items: Vec<OrderItem>, stock_reserved: bool) -> Order {
        let mut order = Order::default();
        let events = order
            .place(
                OrderId::new(),
                PlaceOrder {
                    buyer_id: UserId::new(),
                    address_id: AddressId::new(),
                    items,
                    notes: Some("ring the bell".into()),
                    stock_reserved,
                },
            )
            .unwrap();
        order.apply_events(events);
        order
    }

    fn act(order: &mut Order, seller: SellerId, action: SellerAction) -> Result<(), OrderError> {
        let events = match action {
            SellerAction::Accept => order.accept(seller, false)?,
            SellerAction::Reject => order.reject(seller)?,
            SellerAction::Dispatch => order.dispatch(seller)?,
        };
        order.apply_events(events);
        Ok(())
    }

    #[test]
    fn place_snapshots_items_and_totals() {
        let seller = SellerId::new();
        let order = placed(vec![item(seller, 2, 10_000)], true);

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.totals().total_amount, Money::from_cents(20_000));
        assert_eq!(order.totals().final_amount, Money::from_cents(20_000));
        assert_eq!(order.payment_status(), PaymentStatus::CodPending);
        assert_eq!(order.notes(), Some("ring the bell"));
        assert!(order.fulfillment(seller).unwrap().stock_held);
    }

    #[test]
    fn place_requires_items_and_happens_once() {
        let order = Order::default();
        let input = PlaceOrder {
            buyer_id: UserId::new(),
            address_id: AddressId::new(),
            items: vec![],
            notes: None,
            stock_reserved: true,
        };
        assert_eq!(
            order.place(OrderId::new(), input.clone()).unwrap_err(),
            OrderError::NoItems
        );

        let order = placed(vec![item(SellerId::new(), 1, 100)], true);
        assert_eq!(
            order.place(OrderId::new(), input).unwrap_err(),
            OrderError::AlreadyPlaced
        );
    }

    #[test]
    fn single_seller_happy_path_stamps_timestamps() {
        let seller = SellerId::new();
        let mut order = placed(vec![item(seller, 1, 500)], true);

        act(&mut order, seller, SellerAction::Accept).unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert!(order.confirmed_at().is_some());

        act(&mut order, seller, SellerAction::Dispatch).unwrap();
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert!(order.shipped_at().is_some());
        assert!(order.cancelled_at().is_none());
    }

    #[test]
    fn double_accept_fails_with_current_status() {
        let seller = SellerId::new();
        let mut order = placed(vec![item(seller, 1, 500)], true);
        act(&mut order, seller, SellerAction::Accept).unwrap();

        let err = order.accept(seller, false).unwrap_err();
        assert_eq!(err.to_string(), "Cannot accept an order that is already confirmed");
        assert_eq!(order.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn every_refused_pair_leaves_status_unchanged() {
        let actions = [SellerAction::Accept, SellerAction::Reject, SellerAction::Dispatch];
        let paths: [&[SellerAction]; 4] = [
            &[],
            &[SellerAction::Accept],
            &[SellerAction::Accept, SellerAction::Dispatch],
            &[SellerAction::Reject],
        ];

        for path in paths {
            for action in actions {
                let seller = SellerId::new();
                let mut order = placed(vec![item(seller, 1, 500)], true);
                for step in path {
                    act(&mut order, seller, *step).unwrap();
                }
                let before = order.status();
                let version = order.version();

                match act(&mut order, seller, action) {
                    Ok(()) => assert!(action.allowed_from(before)),
                    Err(err) => {
                        assert!(!action.allowed_from(before));
                        assert!(matches!(err, OrderError::InvalidTransition { .. }));
                        assert_eq!(order.status(), before);
                        assert_eq!(order.version(), version);
                    }
                }
            }
        }
    }

    #[test]
    fn outsider_seller_is_refused() {
        let order = placed(vec![item(SellerId::new(), 1, 500)], true);
        assert_eq!(
            order.accept(SellerId::new(), false).unwrap_err(),
            OrderError::NotSellerOfOrder
        );
    }

    #[test]
    fn multi_seller_status_is_derived() {
        let a = SellerId::new();
        let b = SellerId::new();
        let mut order = placed(vec![item(a, 1, 100), item(b, 2, 200), item(a, 1, 300)], true);
        assert_eq!(order.fulfillments().len(), 2);
        assert_eq!(order.items_of(a).count(), 2);

        act(&mut order, a, SellerAction::Accept).unwrap();
        assert_eq!(order.status(), OrderStatus::Pending);

        act(&mut order, b, SellerAction::Reject).unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert!(order.cancelled_at().is_none());

        act(&mut order, a, SellerAction::Dispatch).unwrap();
        assert_eq!(order.status(), OrderStatus::Shipped);
    }

    #[test]
    fn reject_restores_only_held_stock() {
        let seller = SellerId::new();

        let order = placed(vec![item(seller, 3, 100)], true);
        match &order.reject(seller).unwrap()[0] {
            OrderEvent::SellerRejected(d) => assert!(d.stock_restored),
            other => panic!("unexpected {other:?}"),
        }

        let mut order = placed(vec![item(seller, 3, 100)], false);
        match &order.reject(seller).unwrap()[0] {
            OrderEvent::SellerRejected(d) => assert!(!d.stock_restored),
            other => panic!("unexpected {other:?}"),
        }

        let events = order.accept(seller, true).unwrap();
        order.apply_events(events);
        assert!(order.fulfillment(seller).unwrap().stock_held);
        match &order.reject(seller).unwrap()[0] {
            OrderEvent::SellerRejected(d) => assert!(d.stock_restored),
            other => panic!("unexpected {other:?}"),
        }
    }
}

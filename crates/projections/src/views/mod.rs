//! Read model views for the storefront query side.

pub mod buyer_orders;
pub mod catalog;
pub mod seller_orders;

pub use buyer_orders::BuyerOrdersView;
pub use catalog::CatalogView;
pub use seller_orders::{BuyerContact, SellerOrder, SellerOrdersView};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Duration, Utc};
    use common::{AddressId, AggregateId, OrderId, ProductId, SellerId, UserId};
    use domain::{
        Aggregate, DomainEvent, Money, Order, OrderEvent, OrderItem, PlaceOrder,
    };
    use event_store::{EventEnvelope, StreamId, Version};

    pub fn envelope<E: DomainEvent>(
        aggregate_type: &str,
        id: impl Into<AggregateId>,
        version: i64,
        event: &E,
    ) -> EventEnvelope {
        EventEnvelope::builder()
            .stream(StreamId::new(aggregate_type, id))
            .event_type(event.event_type())
            .version(Version::new(version))
            .payload(event)
            .unwrap()
            .build()
            .unwrap()
    }

    pub fn item(seller: SellerId, name: &str, quantity: u32, cents: i64) -> OrderItem {
        OrderItem::new(
            ProductId::new(),
            seller,
            name,
            quantity,
            Money::from_cents(cents),
        )
        .unwrap()
    }

    /// An `OrderPlaced` event stamped `minutes_ago` minutes in the past.
    pub fn placed(
        order_id: OrderId,
        buyer: UserId,
        items: Vec<OrderItem>,
        minutes_ago: i64,
    ) -> OrderEvent {
        let mut events = Order::default()
            .place(
                order_id,
                PlaceOrder {
                    buyer_id: buyer,
                    address_id: AddressId::new(),
                    items,
                    notes: None,
                    stock_reserved: true,
                },
            )
            .unwrap();
        let mut event = events.remove(0);
        if let OrderEvent::OrderPlaced(data) = &mut event {
            data.placed_at = ago(minutes_ago);
        }
        event
    }

    pub fn ago(minutes: i64) -> DateTime<Utc> {
        Utc::now() - Duration::minutes(minutes)
    }

    /// Replays `events` into an order, for producing follow-up commands.
    pub fn order_from(events: &[OrderEvent]) -> Order {
        let mut order = Order::default();
        order.apply_events(events.iter().cloned());
        order
    }
}

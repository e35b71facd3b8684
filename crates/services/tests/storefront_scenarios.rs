//! End-to-end storefront scenarios over the in-memory event store.

use std::time::Duration;

use common::{AddressId, OrderId, ProductId, UserId};
use domain::{
    Money, NewProduct, OrderStatus, PostalAddress, Product, ProfilePatch, SellerAction,
    SellerApplication, SellerDocuments, UnitOfWork,
};
use event_store::InMemoryEventStore;
use services::{
    CheckoutRequest, ErrorKind, NewAddress, Principal, ProductUpdate, RetryPolicy, ServiceError,
    StockPolicy, Storefront,
};

const POLICIES: [StockPolicy; 2] = [StockPolicy::ReserveAtCheckout, StockPolicy::DecrementOnAccept];

struct TestHarness {
    store: InMemoryEventStore,
    shop: Storefront<InMemoryEventStore>,
    admin: Principal,
}

impl TestHarness {
    fn new(policy: StockPolicy) -> Self {
        let store = InMemoryEventStore::new();
        let shop = Storefront::new(store.clone())
            .with_stock_policy(policy)
            .with_retry_policy(RetryPolicy::new(
                3,
                Duration::from_millis(1),
                Duration::from_millis(2),
            ));
        Self {
            store,
            shop,
            admin: Principal::admin(UserId::new()),
        }
    }

    async fn approved_seller(&self) -> Principal {
        let seller = Principal::member(UserId::new());
        self.shop
            .apply_as_seller(seller, application())
            .await
            .unwrap();
        self.shop
            .approve_seller(self.admin, seller.user_id)
            .await
            .unwrap();
        seller
    }

    async fn list(&self, seller: Principal, name: &str, price_cents: i64, stock: u32) -> ProductId {
        let product = self
            .shop
            .create_product(
                seller,
                NewProduct {
                    name: name.into(),
                    description: "Handwoven".into(),
                    category: "Sarees".into(),
                    images: vec!["https://blob/p.jpg".into()],
                    price: Money::from_cents(price_cents),
                    mrp: None,
                    sub_category: None,
                    tags: Vec::new(),
                    sku: None,
                    stock,
                },
            )
            .await
            .unwrap();
        product.product_id().unwrap()
    }

    async fn buyer(&self) -> (Principal, AddressId) {
        let buyer = Principal::member(UserId::new());
        let address = self
            .shop
            .add_address(
                buyer,
                NewAddress {
                    address: postal("Chennai"),
                    is_default: false,
                },
            )
            .await
            .unwrap();
        (buyer, address.id)
    }

    async fn checkout(&self, buyer: Principal, address: AddressId) -> Result<domain::Order, ServiceError> {
        self.shop
            .checkout(
                buyer,
                CheckoutRequest {
                    address_id: Some(address),
                    payment_method: "cod".into(),
                    notes: None,
                },
            )
            .await
    }

    async fn order_one(&self, buyer: Principal, address: AddressId, product: ProductId, qty: i64) -> OrderId {
        self.shop.set_cart_item(buyer, product, qty).await.unwrap();
        let order = self.checkout(buyer, address).await.unwrap();
        order.order_id().unwrap()
    }

    async fn stock(&self, product_id: ProductId) -> u32 {
        let mut uow = UnitOfWork::new(&self.store);
        let product: Product = uow.load(product_id).await.unwrap();
        product.stock()
    }
}

fn postal(city: &str) -> PostalAddress {
    PostalAddress {
        district: Some("Central".into()),
        street: Some("12 Temple St".into()),
        city: Some(city.into()),
        state: Some("TN".into()),
        zip_code: Some("600001".into()),
        country: Some("India".into()),
    }
}

fn application() -> SellerApplication {
    SellerApplication {
        shop_name: "Weaves of Kanchi".into(),
        gst_number: "33ABCDE1234F1Z5".into(),
        address: postal("Kanchipuram"),
        documents: SellerDocuments {
            pan_card_front: Some("https://blob/pf".into()),
            pan_card_back: Some("https://blob/pb".into()),
            aadhar_card_front: Some("https://blob/af".into()),
            aadhar_card_back: Some("https://blob/ab".into()),
        },
    }
}

#[tokio::test]
async fn checkout_places_a_pending_order_and_empties_the_cart() {
    for policy in POLICIES {
        let h = TestHarness::new(policy);
        let seller = h.approved_seller().await;
        let saree = h.list(seller, "Silk Saree", 100, 5).await;
        let (buyer, address) = h.buyer().await;

        h.shop.set_cart_item(buyer, saree, 2).await.unwrap();
        let order = h.checkout(buyer, address).await.unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.totals().final_amount, Money::from_cents(200));
        assert_eq!(order.buyer_id(), Some(buyer.user_id));
        assert!(h.shop.cart(buyer).await.unwrap().is_empty());

        let expected_stock = match policy {
            StockPolicy::ReserveAtCheckout => 3,
            StockPolicy::DecrementOnAccept => 5,
        };
        assert_eq!(h.stock(saree).await, expected_stock, "{policy}");

        let listed = h.shop.buyer_orders(buyer).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].order_id(), order.order_id());
    }
}

#[tokio::test]
async fn insufficient_stock_names_the_product_and_writes_nothing() {
    for policy in POLICIES {
        let h = TestHarness::new(policy);
        let seller = h.approved_seller().await;
        let saree = h.list(seller, "Silk Saree", 100, 5).await;
        let (buyer, address) = h.buyer().await;

        h.shop.set_cart_item(buyer, saree, 10).await.unwrap();
        let err = h.checkout(buyer, address).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        let message = err.to_string();
        assert!(message.contains("Silk Saree"), "{message}");
        assert!(message.contains('5'), "{message}");

        assert_eq!(h.stock(saree).await, 5);
        assert_eq!(h.shop.cart(buyer).await.unwrap().lines.len(), 1);
        assert!(h.shop.buyer_orders(buyer).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn checkout_validates_in_order() {
    let h = TestHarness::new(StockPolicy::default());
    let seller = h.approved_seller().await;
    let saree = h.list(seller, "Silk Saree", 100, 5).await;
    let (buyer, address) = h.buyer().await;
    let (_, someone_elses) = h.buyer().await;

    let attempt = |address_id: Option<AddressId>, payment: &str| CheckoutRequest {
        address_id,
        payment_method: payment.into(),
        notes: None,
    };

    let err = h.shop.checkout(buyer, attempt(None, "cod")).await.unwrap_err();
    assert_eq!(err.to_string(), "Please select a delivery address");

    let err = h
        .shop
        .checkout(buyer, attempt(Some(someone_elses), "cod"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Address not found");

    let err = h
        .shop
        .checkout(buyer, attempt(Some(address), "card"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Only Cash on Delivery is available at the moment");

    let err = h
        .shop
        .checkout(buyer, attempt(Some(address), "cod"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Your cart is empty");

    h.shop.set_cart_item(buyer, saree, 1).await.unwrap();
    h.shop
        .update_product(
            seller,
            saree,
            ProductUpdate {
                is_available: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let err = h
        .shop
        .checkout(buyer, attempt(Some(address), "cod"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "\"Silk Saree\" is no longer available");
}

#[tokio::test]
async fn reject_returns_held_stock_exactly_once() {
    let h = TestHarness::new(StockPolicy::ReserveAtCheckout);
    let seller = h.approved_seller().await;
    let saree = h.list(seller, "Silk Saree", 100, 5).await;
    let (buyer, address) = h.buyer().await;

    let order_id = h.order_one(buyer, address, saree, 3).await;
    assert_eq!(h.stock(saree).await, 2);

    let outcome = h
        .shop
        .apply_seller_action(seller, order_id, SellerAction::Reject)
        .await
        .unwrap();
    assert_eq!(outcome.message, "Order rejected and stock restored");
    assert_eq!(outcome.order.status(), OrderStatus::Cancelled);
    assert_eq!(h.stock(saree).await, 5);

    let err = h
        .shop
        .apply_seller_action(seller, order_id, SellerAction::Reject)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(h.stock(saree).await, 5);
}

#[tokio::test]
async fn decrement_on_accept_moves_stock_at_acceptance() {
    let h = TestHarness::new(StockPolicy::DecrementOnAccept);
    let seller = h.approved_seller().await;
    let saree = h.list(seller, "Silk Saree", 100, 5).await;
    let (buyer, address) = h.buyer().await;

    let rejected = h.order_one(buyer, address, saree, 2).await;
    let outcome = h
        .shop
        .apply_seller_action(seller, rejected, SellerAction::Reject)
        .await
        .unwrap();
    assert_eq!(outcome.message, "Order rejected");
    assert_eq!(h.stock(saree).await, 5);

    let accepted = h.order_one(buyer, address, saree, 2).await;
    h.shop
        .apply_seller_action(seller, accepted, SellerAction::Accept)
        .await
        .unwrap();
    assert_eq!(h.stock(saree).await, 3);

    let outcome = h
        .shop
        .apply_seller_action(seller, accepted, SellerAction::Reject)
        .await
        .unwrap();
    assert_eq!(outcome.message, "Order rejected and stock restored");
    assert_eq!(h.stock(saree).await, 5);
}

#[tokio::test]
async fn accept_fails_when_stock_ran_out_under_decrement_on_accept() {
    let h = TestHarness::new(StockPolicy::DecrementOnAccept);
    let seller = h.approved_seller().await;
    let saree = h.list(seller, "Silk Saree", 100, 2).await;
    let (first, address_a) = h.buyer().await;
    let (second, address_b) = h.buyer().await;

    let a = h.order_one(first, address_a, saree, 2).await;
    let b = h.order_one(second, address_b, saree, 2).await;

    h.shop
        .apply_seller_action(seller, a, SellerAction::Accept)
        .await
        .unwrap();
    let err = h
        .shop
        .apply_seller_action(seller, b, SellerAction::Accept)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(h.stock(saree).await, 0);

    let order = h.shop.buyer_order(second, b).await.unwrap();
    assert_eq!(order.status(), OrderStatus::Pending);
}

#[tokio::test]
async fn transitions_follow_the_status_machine() {
    let h = TestHarness::new(StockPolicy::default());
    let seller = h.approved_seller().await;
    let saree = h.list(seller, "Silk Saree", 100, 5).await;
    let (buyer, address) = h.buyer().await;
    let order_id = h.order_one(buyer, address, saree, 1).await;

    let err = h
        .shop
        .apply_seller_action(seller, order_id, SellerAction::Dispatch)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot dispatch an order that is already pending");

    let outcome = h
        .shop
        .apply_seller_action(seller, order_id, SellerAction::Accept)
        .await
        .unwrap();
    assert_eq!(outcome.message, "Order accepted successfully");
    assert_eq!(outcome.order.status(), OrderStatus::Confirmed);

    let err = h
        .shop
        .apply_seller_action(seller, order_id, SellerAction::Accept)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(err.to_string(), "Cannot accept an order that is already confirmed");

    let outcome = h
        .shop
        .apply_seller_action(seller, order_id, SellerAction::Dispatch)
        .await
        .unwrap();
    assert_eq!(outcome.message, "Order dispatched successfully");
    assert_eq!(outcome.order.status(), OrderStatus::Shipped);

    let err = h
        .shop
        .apply_seller_action(seller, order_id, SellerAction::Reject)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot reject an order that is already shipped");
    assert_eq!(h.stock(saree).await, 4);
}

#[tokio::test]
async fn sellers_act_only_on_their_own_share() {
    let h = TestHarness::new(StockPolicy::default());
    let weaver = h.approved_seller().await;
    let potter = h.approved_seller().await;
    let saree = h.list(weaver, "Silk Saree", 100, 5).await;
    let pot = h.list(potter, "Clay Pot", 40, 5).await;
    let (buyer, address) = h.buyer().await;

    h.shop.set_cart_item(buyer, saree, 1).await.unwrap();
    h.shop.set_cart_item(buyer, pot, 2).await.unwrap();
    let order = h.checkout(buyer, address).await.unwrap();
    let order_id = order.order_id().unwrap();
    assert_eq!(order.totals().final_amount, Money::from_cents(180));

    let weaver_view = h.shop.seller_orders(weaver).await.unwrap();
    assert_eq!(weaver_view.len(), 1);
    assert_eq!(weaver_view[0].items.len(), 1);
    assert_eq!(weaver_view[0].seller_total, Money::from_cents(100));

    h.shop
        .apply_seller_action(weaver, order_id, SellerAction::Accept)
        .await
        .unwrap();
    let outcome = h
        .shop
        .apply_seller_action(potter, order_id, SellerAction::Reject)
        .await
        .unwrap();
    assert_eq!(outcome.order.status(), OrderStatus::Confirmed);
    assert_eq!(h.stock(pot).await, 5);
    assert_eq!(h.stock(saree).await, 4);

    let stranger = h.approved_seller().await;
    let err = h
        .shop
        .apply_seller_action(stranger, order_id, SellerAction::Accept)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(err.to_string(), "No items in this order belong to you");

    let err = h
        .shop
        .apply_seller_action(weaver, OrderId::new(), SellerAction::Accept)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn unapproved_sellers_are_forbidden() {
    let h = TestHarness::new(StockPolicy::default());
    let applicant = Principal::member(UserId::new());

    let err = h.shop.seller_orders(applicant).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(err.to_string(), "Not an approved seller");

    h.shop.apply_as_seller(applicant, application()).await.unwrap();
    let err = h.shop.seller_products(applicant).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = h
        .shop
        .approve_seller(applicant, applicant.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Administrator access required");

    h.shop.approve_seller(h.admin, applicant.user_id).await.unwrap();
    assert!(h.shop.seller_products(applicant).await.unwrap().is_empty());
}

#[tokio::test]
async fn placed_orders_keep_their_price_snapshot() {
    let h = TestHarness::new(StockPolicy::default());
    let seller = h.approved_seller().await;
    let saree = h.list(seller, "Silk Saree", 100, 5).await;
    let (buyer, address) = h.buyer().await;
    let order_id = h.order_one(buyer, address, saree, 2).await;

    h.shop
        .update_product(
            seller,
            saree,
            ProductUpdate {
                price: Some(Money::from_cents(150)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let order = h.shop.buyer_order(buyer, order_id).await.unwrap();
    assert_eq!(order.items()[0].unit_price, Money::from_cents(100));
    assert_eq!(order.totals().final_amount, Money::from_cents(200));

    h.shop.set_cart_item(buyer, saree, 1).await.unwrap();
    let cart = h.shop.cart(buyer).await.unwrap();
    assert_eq!(cart.total, Money::from_cents(150));
}

#[tokio::test]
async fn racing_buyers_cannot_both_take_the_last_unit() {
    let h = TestHarness::new(StockPolicy::ReserveAtCheckout);
    let seller = h.approved_seller().await;
    let saree = h.list(seller, "Silk Saree", 100, 1).await;
    let (first, address_a) = h.buyer().await;
    let (second, address_b) = h.buyer().await;
    h.shop.set_cart_item(first, saree, 1).await.unwrap();
    h.shop.set_cart_item(second, saree, 1).await.unwrap();

    let (a, b) = tokio::join!(h.checkout(first, address_a), h.checkout(second, address_b));

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let loser = if a.is_ok() { b } else { a };
    assert_eq!(loser.unwrap_err().kind(), ErrorKind::ValidationFailed);
    assert_eq!(h.stock(saree).await, 0);
}

#[tokio::test]
async fn racing_sellers_settle_one_action() {
    for policy in POLICIES {
        let h = TestHarness::new(policy);
        let seller = h.approved_seller().await;
        let saree = h.list(seller, "Silk Saree", 100, 5).await;
        let (buyer, address) = h.buyer().await;
        let order_id = h.order_one(buyer, address, saree, 2).await;
        let before = h.stock(saree).await;

        let (a, b) = tokio::join!(
            h.shop.apply_seller_action(seller, order_id, SellerAction::Reject),
            h.shop.apply_seller_action(seller, order_id, SellerAction::Reject),
        );

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1, "{policy:?}");
        let loser = if a.is_ok() { b } else { a };
        let err = loser.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(err.to_string(), "Cannot reject an order that is already cancelled");
        // Held stock comes back once; unheld stock never moved.
        assert_eq!(h.stock(saree).await, 5, "{policy:?}, was {before}");
    }

    let h = TestHarness::new(StockPolicy::DecrementOnAccept);
    let seller = h.approved_seller().await;
    let saree = h.list(seller, "Silk Saree", 100, 5).await;
    let (buyer, address) = h.buyer().await;
    let order_id = h.order_one(buyer, address, saree, 2).await;

    let (a, b) = tokio::join!(
        h.shop.apply_seller_action(seller, order_id, SellerAction::Accept),
        h.shop.apply_seller_action(seller, order_id, SellerAction::Accept),
    );
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    assert_eq!(h.stock(saree).await, 3);
}

#[tokio::test]
async fn oversized_totals_are_refused() {
    let h = TestHarness::new(StockPolicy::default());
    let seller = h.approved_seller().await;

    let err = h
        .shop
        .create_product(
            seller,
            NewProduct {
                name: "Gold Saree".into(),
                description: "Zari".into(),
                category: "Sarees".into(),
                images: vec!["https://blob/g.jpg".into()],
                price: Money::from_cents(i64::MAX / 2),
                mrp: None,
                sub_category: None,
                tags: Vec::new(),
                sku: None,
                stock: 3,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);

    let qty: i64 = 100_000_000;
    let dear = h.list(seller, "Dear Saree", Money::MAX_UNIT_PRICE.cents(), 100_000_000).await;
    let (buyer, address) = h.buyer().await;
    let err = h.shop.set_cart_item(buyer, dear, qty).await.unwrap_err();
    assert_eq!(err.to_string(), "Cart total is too large");
    assert!(h.shop.cart(buyer).await.unwrap().lines.is_empty());

    // A line that fit when added can overflow after a reprice.
    let cheap = h.list(seller, "Cheap Saree", 1, 100_000_000).await;
    h.shop.set_cart_item(buyer, cheap, qty).await.unwrap();
    h.shop
        .update_product(
            seller,
            cheap,
            ProductUpdate {
                price: Some(Money::MAX_UNIT_PRICE),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = h.shop.cart(buyer).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    let err = h.checkout(buyer, address).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(err.to_string(), "Order total is too large");
    assert_eq!(h.stock(cheap).await, 100_000_000);
}

#[tokio::test]
async fn skus_are_unique_across_sellers() {
    let h = TestHarness::new(StockPolicy::default());
    let (first, second) = (h.approved_seller().await, h.approved_seller().await);
    let listing = |sku: &str| NewProduct {
        name: "Silk Saree".into(),
        description: "Handwoven".into(),
        category: "Sarees".into(),
        images: vec!["https://blob/p.jpg".into()],
        price: Money::from_cents(9_000),
        mrp: Some(Money::from_cents(12_000)),
        sub_category: Some("Kanjivaram".into()),
        tags: vec!["silk".into()],
        sku: Some(sku.into()),
        stock: 2,
    };

    let product = h.shop.create_product(first, listing("KAN-01")).await.unwrap();
    assert_eq!(product.sku(), Some("KAN-01"));

    let err = h
        .shop
        .create_product(second, listing("  KAN-01 "))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(err.to_string(), "SKU already exists");
    assert!(h.shop.seller_products(second).await.unwrap().is_empty());

    let (a, b) = tokio::join!(
        h.shop.create_product(first, listing("KAN-02")),
        h.shop.create_product(second, listing("KAN-02")),
    );
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);

    // No SKU, no claim.
    let mut plain = listing("");
    plain.sku = None;
    h.shop.create_product(first, plain.clone()).await.unwrap();
    h.shop.create_product(first, plain).await.unwrap();
}

#[tokio::test]
async fn sellers_see_the_buyer_contact() {
    let h = TestHarness::new(StockPolicy::default());
    let seller = h.approved_seller().await;
    let saree = h.list(seller, "Silk Saree", 100, 5).await;
    let (buyer, address) = h.buyer().await;

    h.shop
        .update_buyer_profile(
            buyer,
            ProfilePatch {
                first_name: Some("Asha".into()),
                phone: Some("98450 00000".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let profile = h
        .shop
        .update_buyer_profile(
            buyer,
            ProfilePatch {
                last_name: Some("Rao".into()),
                first_name: Some("  ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.full_name().as_deref(), Some("Asha Rao"));
    assert_eq!(
        h.shop.buyer_profile(buyer).await.unwrap().phone(),
        Some("98450 00000")
    );

    h.order_one(buyer, address, saree, 1).await;
    let orders = h.shop.seller_orders(seller).await.unwrap();
    assert_eq!(orders[0].buyer.name, "Asha Rao");
    assert_eq!(orders[0].buyer.phone.as_deref(), Some("98450 00000"));
}

#[tokio::test]
async fn transient_store_failures_are_retried() {
    let h = TestHarness::new(StockPolicy::default());
    let seller = h.approved_seller().await;
    let saree = h.list(seller, "Silk Saree", 100, 5).await;
    let (buyer, address) = h.buyer().await;
    h.shop.set_cart_item(buyer, saree, 1).await.unwrap();

    h.store.fail_next_commits(2).await;
    h.checkout(buyer, address).await.unwrap();
    assert_eq!(h.stock(saree).await, 4);

    h.shop.set_cart_item(buyer, saree, 1).await.unwrap();
    h.store.fail_next_commits(3).await;
    let err = h.checkout(buyer, address).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.public_message(), "Internal Server Error");
    assert_eq!(h.stock(saree).await, 4);
}

#[tokio::test]
async fn address_book_keeps_one_default() {
    let h = TestHarness::new(StockPolicy::default());
    let (buyer, first) = h.buyer().await;

    let second = h
        .shop
        .add_address(
            buyer,
            NewAddress {
                address: postal("Madurai"),
                is_default: true,
            },
        )
        .await
        .unwrap();
    h.shop
        .add_address(
            buyer,
            NewAddress {
                address: postal("Salem"),
                is_default: false,
            },
        )
        .await
        .unwrap();

    let listed = h.shop.addresses(buyer).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed.iter().filter(|a| a.is_default).count(), 1);
    assert_eq!(listed[0].id, second.id);

    h.shop.remove_address(buyer, first).await.unwrap();
    let err = h.shop.remove_address(buyer, first).await.unwrap_err();
    assert_eq!(err.to_string(), "Address not found");

    let (stranger, _) = h.buyer().await;
    let err = h
        .shop
        .update_address(stranger, second.id, Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn product_updates_are_owner_only() {
    let h = TestHarness::new(StockPolicy::default());
    let owner = h.approved_seller().await;
    let other = h.approved_seller().await;
    let saree = h.list(owner, "Silk Saree", 100, 5).await;

    let err = h.shop.overwrite_stock(other, saree, 9).await.unwrap_err();
    assert_eq!(err.to_string(), "Product not found or not yours");

    let err = h.shop.overwrite_stock(owner, saree, -1).await.unwrap_err();
    assert_eq!(err.to_string(), "Stock must be 0 or greater");

    let product = h.shop.overwrite_stock(owner, saree, 9).await.unwrap();
    assert_eq!(product.stock(), 9);

    let listed = h.shop.seller_products(owner).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].stock(), 9);
}

#[tokio::test]
async fn seller_documents_land_in_the_applicant_folder() {
    let h = TestHarness::new(StockPolicy::default());
    let applicant = Principal::member(UserId::new());

    let err = h
        .shop
        .upload_seller_document(applicant, domain::DocumentKind::PanCardFront, vec![], "image/png")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No file provided");

    let blob = h
        .shop
        .upload_seller_document(applicant, domain::DocumentKind::PanCardFront, vec![1, 2, 3], "image/png")
        .await
        .unwrap();
    assert!(blob
        .url
        .starts_with(&format!("memory://seller-docs/{}/", applicant.user_id)));
}

#[tokio::test]
async fn read_models_catch_up_from_the_store() {
    let h = TestHarness::new(StockPolicy::default());
    let seller = h.approved_seller().await;
    let saree = h.list(seller, "Silk Saree", 100, 5).await;
    let (buyer, address) = h.buyer().await;
    h.order_one(buyer, address, saree, 1).await;

    let fresh = Storefront::new(h.store.clone());
    assert!(fresh.buyer_orders(buyer).await.unwrap().is_empty());
    fresh.catch_up().await.unwrap();
    assert_eq!(fresh.buyer_orders(buyer).await.unwrap().len(), 1);
    assert_eq!(fresh.seller_orders(seller).await.unwrap().len(), 1);
}

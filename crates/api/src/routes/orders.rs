//! Checkout and the buyer's order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{AddressId, OrderId, ProductId, SellerId, UserId};
use domain::{Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, ShippingMethod};
use event_store::EventStore;
use serde::{Deserialize, Serialize};
use services::CheckoutRequest;

use super::{AppState, Authenticated, JsonBody, parse_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckoutBody {
    pub address_id: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: Option<OrderId>,
    pub buyer_id: Option<UserId>,
    pub address_id: Option<AddressId>,
    pub status: OrderStatus,
    pub items: Vec<OrderItemResponse>,
    pub sellers: Vec<SellerShareResponse>,
    pub total_amount_cents: i64,
    pub discount_cents: i64,
    pub shipping_charge_cents: i64,
    pub final_amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub shipping_method: ShippingMethod,
    pub notes: Option<String>,
    pub placed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
}

#[derive(Serialize)]
pub struct SellerShareResponse {
    pub seller_id: SellerId,
    pub status: OrderStatus,
}

#[derive(Serialize)]
pub struct OrderEnvelope {
    pub success: bool,
    pub order: OrderResponse,
}

#[derive(Serialize)]
pub struct OrderListResponse {
    pub success: bool,
    pub orders: Vec<OrderResponse>,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            seller_id: item.seller_id,
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            total_price_cents: item.total_price.cents(),
        }
    }
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        let totals = order.totals();
        Self {
            id: order.order_id(),
            buyer_id: order.buyer_id(),
            address_id: order.address_id(),
            status: order.status(),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
            sellers: order
                .fulfillments()
                .iter()
                .map(|f| SellerShareResponse {
                    seller_id: f.seller_id,
                    status: f.status,
                })
                .collect(),
            total_amount_cents: totals.total_amount.cents(),
            discount_cents: totals.discount.cents(),
            shipping_charge_cents: totals.shipping_charge.cents(),
            final_amount_cents: totals.final_amount.cents(),
            payment_method: order.payment_method(),
            payment_status: order.payment_status(),
            shipping_method: order.shipping_method(),
            notes: order.notes().map(str::to_string),
            placed_at: order.placed_at(),
            updated_at: order.updated_at(),
            confirmed_at: order.confirmed_at(),
            shipped_at: order.shipped_at(),
            cancelled_at: order.cancelled_at(),
        }
    }
}

// -- Handlers --

/// POST /checkout: place an order from the caller's cart.
#[tracing::instrument(skip(state, principal, req))]
pub async fn checkout<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    JsonBody(req): JsonBody<CheckoutBody>,
) -> Result<(StatusCode, Json<OrderEnvelope>), ApiError> {
    let address_id = match req.address_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_id(raw, "address id")?),
        _ => None,
    };
    let request = CheckoutRequest {
        address_id,
        payment_method: req.payment_method.unwrap_or_default(),
        notes: req.notes,
    };

    let order = state.shop.checkout(principal, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(OrderEnvelope {
            success: true,
            order: OrderResponse::from(&order),
        }),
    ))
}

/// GET /orders: the caller's orders, newest first.
#[tracing::instrument(skip(state, principal))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
) -> Result<Json<OrderListResponse>, ApiError> {
    let orders = state.shop.buyer_orders(principal).await?;
    Ok(Json(OrderListResponse {
        success: true,
        orders: orders.iter().map(OrderResponse::from).collect(),
    }))
}

/// GET /orders/{id}: one of the caller's orders.
#[tracing::instrument(skip(state, principal))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    let order_id = parse_id(&id, "order id")?;
    let order = state.shop.buyer_order(principal, order_id).await?;
    Ok(Json(OrderEnvelope {
        success: true,
        order: OrderResponse::from(&order),
    }))
}

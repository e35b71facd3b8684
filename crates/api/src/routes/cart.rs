//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use common::{ProductId, SellerId};
use event_store::EventStore;
use serde::{Deserialize, Serialize};
use services::{CartSnapshot, CartSnapshotLine};

use super::{AppState, Authenticated, JsonBody, require_id};
use crate::error::ApiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetCartItemRequest {
    pub product_id: Option<String>,
    /// Zero or less removes the line.
    pub quantity: i64,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct CartLineResponse {
    pub product_id: ProductId,
    pub seller_id: Option<SellerId>,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub is_available: bool,
    pub stock: u32,
}

impl From<CartSnapshot> for CartResponse {
    fn from(cart: CartSnapshot) -> Self {
        Self {
            total_cents: cart.total.cents(),
            items: cart.lines.into_iter().map(CartLineResponse::from).collect(),
        }
    }
}

impl From<CartSnapshotLine> for CartLineResponse {
    fn from(line: CartSnapshotLine) -> Self {
        Self {
            product_id: line.product_id,
            seller_id: line.seller_id,
            name: line.name,
            quantity: line.quantity,
            unit_price_cents: line.unit_price.cents(),
            line_total_cents: line.line_total.cents(),
            is_available: line.is_available,
            stock: line.stock,
        }
    }
}

/// GET /cart: the caller's cart at current prices.
#[tracing::instrument(skip(state, principal))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.shop.cart(principal).await?;
    Ok(Json(cart.into()))
}

/// PUT /cart/items: set one product's quantity.
#[tracing::instrument(skip(state, principal, req))]
pub async fn set_item<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    JsonBody(req): JsonBody<SetCartItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let product_id: ProductId =
        require_id(req.product_id.as_deref(), "product id", "Product ID is required")?;
    let cart = state
        .shop
        .set_cart_item(principal, product_id, req.quantity)
        .await?;
    Ok(Json(cart.into()))
}

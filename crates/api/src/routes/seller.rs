//! Seller endpoints: onboarding, catalog and fulfillment.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};
use common::{AddressId, OrderId, ProductId, SellerId, UserId};
use domain::{
    DocumentKind, Money, NewProduct, OrderStatus, PaymentMethod, PaymentStatus, PostalAddress,
    Product, SellerAction, SellerApplication, SellerDocuments, SellerProfile,
};
use event_store::EventStore;
use projections::SellerOrder;
use serde::{Deserialize, Serialize};
use services::ProductUpdate;

use super::orders::{OrderItemResponse, OrderResponse};
use super::{AppState, Authenticated, JsonBody, require_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplyRequest {
    #[serde(default)]
    pub shop_name: String,
    #[serde(default)]
    pub gst_number: String,
    #[serde(default)]
    pub address: PostalAddress,
    #[serde(default)]
    pub docs: SellerDocuments,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub price_cents: Option<i64>,
    pub mrp_cents: Option<i64>,
    pub sub_category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub sku: Option<String>,
    pub stock: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProductRequest {
    pub product_id: Option<String>,
    pub price_cents: Option<i64>,
    pub is_available: Option<bool>,
    pub stock: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SellerActionRequest {
    pub order_id: Option<String>,
    /// `confirmed`, `cancelled` or `shipped`.
    pub action: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct SellerProfileResponse {
    pub user_id: Option<UserId>,
    pub seller_id: Option<SellerId>,
    pub shop_name: String,
    pub gst_number: String,
    pub address: PostalAddress,
    pub docs: SellerDocuments,
    pub is_requested_for_seller: bool,
    pub is_approved_by_admin: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ProfileEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub seller_profile: Option<SellerProfileResponse>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: Option<ProductId>,
    pub seller_id: Option<SellerId>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub price_cents: i64,
    pub mrp_cents: Option<i64>,
    pub sub_category: Option<String>,
    pub tags: Vec<String>,
    pub sku: Option<String>,
    pub stock: u32,
    pub is_available: bool,
    pub listed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
}

#[derive(Serialize)]
pub struct ProductEnvelope {
    pub message: &'static str,
    pub product: ProductResponse,
}

#[derive(Serialize)]
pub struct BuyerContactResponse {
    pub name: String,
    pub phone: Option<String>,
}

/// Buyer contact is sent whole; the UI decides how much to reveal.
#[derive(Serialize)]
pub struct SellerOrderResponse {
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub buyer: BuyerContactResponse,
    pub address_id: AddressId,
    /// The caller's own sub-status.
    pub status: OrderStatus,
    pub order_status: OrderStatus,
    pub items: Vec<OrderItemResponse>,
    pub seller_total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub placed_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct SellerOrderListResponse {
    pub success: bool,
    pub orders: Vec<SellerOrderResponse>,
}

#[derive(Serialize)]
pub struct SellerActionResponse {
    pub success: bool,
    pub message: &'static str,
    pub order: OrderResponse,
}

impl From<&SellerProfile> for SellerProfileResponse {
    fn from(profile: &SellerProfile) -> Self {
        Self {
            user_id: profile.user_id(),
            seller_id: profile.seller_id(),
            shop_name: profile.shop_name().to_string(),
            gst_number: profile.gst_number().to_string(),
            address: profile.address().clone(),
            docs: profile.documents().clone(),
            is_requested_for_seller: profile.is_requested(),
            is_approved_by_admin: profile.is_approved(),
            submitted_at: profile.submitted_at(),
            approved_at: profile.approved_at(),
        }
    }
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.product_id(),
            seller_id: product.seller_id(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            category: product.category().to_string(),
            images: product.images().to_vec(),
            price_cents: product.price().cents(),
            mrp_cents: product.mrp().map(|m| m.cents()),
            sub_category: product.sub_category().map(str::to_string),
            tags: product.tags().to_vec(),
            sku: product.sku().map(str::to_string),
            stock: product.stock(),
            is_available: product.is_available(),
            listed_at: product.listed_at(),
        }
    }
}

impl From<SellerOrder> for SellerOrderResponse {
    fn from(order: SellerOrder) -> Self {
        Self {
            order_id: order.order_id,
            buyer_id: order.buyer_id,
            buyer: BuyerContactResponse {
                name: order.buyer.name,
                phone: order.buyer.phone,
            },
            address_id: order.address_id,
            status: order.status,
            order_status: order.order_status,
            items: order.items.iter().map(OrderItemResponse::from).collect(),
            seller_total_cents: order.seller_total.cents(),
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            notes: order.notes,
            placed_at: order.placed_at,
            confirmed_at: order.confirmed_at,
            shipped_at: order.shipped_at,
            cancelled_at: order.cancelled_at,
        }
    }
}

/// Money from a client-supplied cent amount; out-of-range values fail.
fn price(cents: Option<i64>) -> Result<Money, ApiError> {
    match cents.map(Money::from_cents) {
        Some(price) if price.is_valid_unit_price() => Ok(price),
        _ => Err(ApiError::bad_request("Valid price is required")),
    }
}

// -- Onboarding --

/// GET /seller/apply: the caller's application, or null if none.
#[tracing::instrument(skip(state, principal))]
pub async fn profile<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
) -> Result<Json<ProfileEnvelope>, ApiError> {
    let profile = state.shop.seller_profile(principal).await?;
    Ok(Json(ProfileEnvelope {
        message: None,
        seller_profile: profile
            .is_requested()
            .then(|| SellerProfileResponse::from(&profile)),
    }))
}

/// POST /seller/apply: submit or resubmit an application.
#[tracing::instrument(skip(state, principal, req))]
pub async fn apply<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    JsonBody(req): JsonBody<ApplyRequest>,
) -> Result<Json<ProfileEnvelope>, ApiError> {
    let application = SellerApplication {
        shop_name: req.shop_name,
        gst_number: req.gst_number,
        address: req.address,
        documents: req.docs,
    };
    let profile = state.shop.apply_as_seller(principal, application).await?;
    Ok(Json(ProfileEnvelope {
        message: Some("Seller application submitted successfully"),
        seller_profile: Some(SellerProfileResponse::from(&profile)),
    }))
}

/// POST /seller/documents/{kind}: raw file body, typed by `Content-Type`.
#[tracing::instrument(skip(state, principal, headers, body))]
pub async fn upload_document<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    Path(kind): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let kind = DocumentKind::parse(&kind).ok_or_else(|| ApiError::bad_request("Invalid docType"))?;
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let blob = state
        .shop
        .upload_seller_document(principal, kind, body.to_vec(), content_type)
        .await?;
    Ok(Json(UploadResponse { url: blob.url }))
}

// -- Catalog --

/// GET /seller/products: newest first.
#[tracing::instrument(skip(state, principal))]
pub async fn products<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.shop.seller_products(principal).await?;
    Ok(Json(ProductListResponse {
        products: products.iter().map(ProductResponse::from).collect(),
    }))
}

/// POST /seller/products
#[tracing::instrument(skip(state, principal, req))]
pub async fn create_product<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    JsonBody(req): JsonBody<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductEnvelope>), ApiError> {
    let price = price(req.price_cents)?;
    let mrp = req.mrp_cents.map(Money::from_cents);
    let stock = req
        .stock
        .and_then(|s| u32::try_from(s).ok())
        .ok_or_else(|| ApiError::bad_request("Valid stock is required"))?;

    let listing = NewProduct {
        name: req.name,
        description: req.description,
        category: req.category,
        images: req.images,
        price,
        mrp,
        sub_category: req.sub_category,
        tags: req.tags,
        sku: req.sku,
        stock,
    };
    let product = state.shop.create_product(principal, listing).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductEnvelope {
            message: "Product created successfully",
            product: ProductResponse::from(&product),
        }),
    ))
}

/// PATCH /seller/products: price, availability and stock of one product.
#[tracing::instrument(skip(state, principal, req))]
pub async fn update_product<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    JsonBody(req): JsonBody<UpdateProductRequest>,
) -> Result<Json<ProductEnvelope>, ApiError> {
    let product_id: ProductId =
        require_id(req.product_id.as_deref(), "product id", "Product ID is required")?;
    let update = ProductUpdate {
        price: req.price_cents.map(|c| price(Some(c))).transpose()?,
        is_available: req.is_available,
        stock: req.stock,
    };

    let product = state
        .shop
        .update_product(principal, product_id, update)
        .await?;
    Ok(Json(ProductEnvelope {
        message: "Product updated successfully",
        product: ProductResponse::from(&product),
    }))
}

// -- Fulfillment --

/// GET /seller/orders: orders holding the caller's items, newest first.
#[tracing::instrument(skip(state, principal))]
pub async fn orders<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
) -> Result<Json<SellerOrderListResponse>, ApiError> {
    let orders = state.shop.seller_orders(principal).await?;
    Ok(Json(SellerOrderListResponse {
        success: true,
        orders: orders.into_iter().map(SellerOrderResponse::from).collect(),
    }))
}

/// PATCH /seller/orders: accept, reject or dispatch the caller's share.
#[tracing::instrument(skip(state, principal, req))]
pub async fn act_on_order<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    JsonBody(req): JsonBody<SellerActionRequest>,
) -> Result<Json<SellerActionResponse>, ApiError> {
    let order_id: OrderId =
        require_id(req.order_id.as_deref(), "order id", "Order ID is required")?;
    let action = req
        .action
        .as_deref()
        .and_then(SellerAction::from_wire)
        .ok_or_else(|| {
            ApiError::bad_request("Action must be 'confirmed', 'cancelled', or 'shipped'")
        })?;

    let outcome = state
        .shop
        .apply_seller_action(principal, order_id, action)
        .await?;
    Ok(Json(SellerActionResponse {
        success: true,
        message: outcome.message,
        order: OrderResponse::from(&outcome.order),
    }))
}

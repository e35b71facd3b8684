//! HTTP API server with observability for the storefront.
//!
//! Provides REST endpoints for the buyer (cart, checkout, orders, addresses),
//! the seller (onboarding, catalog, fulfillment) and administrators, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use services::{AuthProvider, Storefront};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        // Buyer
        .route("/cart", get(routes::cart::get::<S>))
        .route("/cart/items", put(routes::cart::set_item::<S>))
        .route("/checkout", post(routes::orders::checkout::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route(
            "/user/addresses",
            get(routes::accounts::list::<S>)
                .post(routes::accounts::create::<S>)
                .put(routes::accounts::update::<S>),
        )
        .route("/user/addresses/{id}", delete(routes::accounts::remove::<S>))
        .route(
            "/user/profile",
            get(routes::accounts::profile::<S>).post(routes::accounts::update_profile::<S>),
        )
        // Seller
        .route(
            "/seller/apply",
            get(routes::seller::profile::<S>).post(routes::seller::apply::<S>),
        )
        .route(
            "/seller/documents/{kind}",
            post(routes::seller::upload_document::<S>),
        )
        .route(
            "/seller/products",
            get(routes::seller::products::<S>)
                .post(routes::seller::create_product::<S>)
                .patch(routes::seller::update_product::<S>),
        )
        .route(
            "/seller/orders",
            get(routes::seller::orders::<S>).patch(routes::seller::act_on_order::<S>),
        )
        // Admin
        .route(
            "/admin/sellers/{user_id}/approve",
            post(routes::admin::approve_seller::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the application state over `store` with the configured policies.
pub fn create_state<S: EventStore + Clone + 'static>(
    store: S,
    config: &Config,
    auth: Arc<dyn AuthProvider>,
) -> Arc<AppState<S>> {
    let shop = Storefront::new(store)
        .with_stock_policy(config.stock_policy)
        .with_retry_policy(config.retry);
    Arc::new(AppState::new(shop, auth))
}

//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use event_store::EventStore;
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub stock_policy: &'static str,
    pub read_models: Vec<ReadModelHealth>,
}

#[derive(Serialize)]
pub struct ReadModelHealth {
    pub name: &'static str,
    pub entries: usize,
}

/// GET /health: liveness plus the size of each read model.
pub async fn check<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HealthResponse> {
    let read_models = state
        .shop
        .read_models()
        .into_iter()
        .map(|model| ReadModelHealth {
            name: model.name(),
            entries: model.count(),
        })
        .collect();

    Json(HealthResponse {
        status: "ok",
        stock_policy: state.shop.stock_policy().as_str(),
        read_models,
    })
}

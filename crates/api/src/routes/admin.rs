//! Administrator endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::UserId;
use event_store::EventStore;

use super::seller::{ProfileEnvelope, SellerProfileResponse};
use super::{AppState, Authenticated, parse_id};
use crate::error::ApiError;

/// POST /admin/sellers/{user_id}/approve
#[tracing::instrument(skip(state, principal))]
pub async fn approve_seller<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileEnvelope>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user id")?;
    let profile = state.shop.approve_seller(principal, user_id).await?;
    Ok(Json(ProfileEnvelope {
        message: Some("Seller approved"),
        seller_profile: Some(SellerProfileResponse::from(&profile)),
    }))
}

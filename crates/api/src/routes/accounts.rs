//! Buyer account endpoints: address book and profile.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::AddressId;
use domain::{AddressPatch, BuyerProfile, Gender, PostalAddress, ProfilePatch, UserAddress};
use event_store::EventStore;
use serde::{Deserialize, Serialize};
use services::NewAddress;

use super::{AppState, Authenticated, JsonBody, parse_id, require_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddressBody {
    pub district: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddressUpdateBody {
    pub id: Option<String>,
    pub district: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub is_default: Option<bool>,
}

/// Partial profile update. Blank strings are ignored, as is an unknown
/// gender.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileBody {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<u32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct AddressResponse {
    pub id: AddressId,
    #[serde(flatten)]
    pub address: PostalAddress,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct AddressListResponse {
    pub addresses: Vec<AddressResponse>,
}

#[derive(Serialize)]
pub struct AddressChangedResponse {
    pub message: &'static str,
    pub address: AddressResponse,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<u32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<Gender>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ProfileEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub profile: ProfileResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<AddressResponse>>,
}

impl From<&BuyerProfile> for ProfileResponse {
    fn from(profile: &BuyerProfile) -> Self {
        Self {
            first_name: profile.first_name().map(str::to_string),
            last_name: profile.last_name().map(str::to_string),
            phone: profile.phone().map(str::to_string),
            age: profile.age(),
            height: profile.height(),
            weight: profile.weight(),
            gender: profile.gender(),
            updated_at: profile.updated_at(),
        }
    }
}

impl From<UserAddress> for AddressResponse {
    fn from(entry: UserAddress) -> Self {
        Self {
            id: entry.id,
            address: entry.address,
            is_default: entry.is_default,
            created_at: entry.created_at,
        }
    }
}

impl AddressUpdateBody {
    fn into_patch(self) -> AddressPatch {
        AddressPatch {
            district: self.district,
            street: self.street,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
            is_default: self.is_default,
        }
    }
}

impl ProfileBody {
    fn into_patch(self) -> ProfilePatch {
        ProfilePatch {
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            age: self.age,
            height: self.height,
            weight: self.weight,
            gender: self.gender.as_deref().and_then(Gender::parse),
        }
    }
}

impl AddressBody {
    fn into_new(self) -> NewAddress {
        NewAddress {
            is_default: self.is_default.unwrap_or(false),
            address: PostalAddress {
                district: self.district,
                street: self.street,
                city: self.city,
                state: self.state,
                zip_code: self.zip_code,
                country: self.country,
            },
        }
    }
}

// -- Handlers --

/// GET /user/addresses: default first.
#[tracing::instrument(skip(state, principal))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
) -> Result<Json<AddressListResponse>, ApiError> {
    let addresses = state.shop.addresses(principal).await?;
    Ok(Json(AddressListResponse {
        addresses: addresses.into_iter().map(AddressResponse::from).collect(),
    }))
}

/// POST /user/addresses
#[tracing::instrument(skip(state, principal, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    JsonBody(req): JsonBody<AddressBody>,
) -> Result<(StatusCode, Json<AddressChangedResponse>), ApiError> {
    let address = state.shop.add_address(principal, req.into_new()).await?;
    Ok((
        StatusCode::CREATED,
        Json(AddressChangedResponse {
            message: "Address created successfully",
            address: address.into(),
        }),
    ))
}

/// PUT /user/addresses: partial update of the address named by `id`.
#[tracing::instrument(skip(state, principal, req))]
pub async fn update<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    JsonBody(req): JsonBody<AddressUpdateBody>,
) -> Result<Json<AddressChangedResponse>, ApiError> {
    let address_id: AddressId =
        require_id(req.id.as_deref(), "address id", "Address ID is required")?;
    let address = state
        .shop
        .update_address(principal, address_id, req.into_patch())
        .await?;
    Ok(Json(AddressChangedResponse {
        message: "Address updated successfully",
        address: address.into(),
    }))
}

/// DELETE /user/addresses/{id}
#[tracing::instrument(skip(state, principal))]
pub async fn remove<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let address_id = parse_id(&id, "address id")?;
    state.shop.remove_address(principal, address_id).await?;
    Ok(Json(MessageResponse {
        message: "Address deleted successfully",
    }))
}

/// GET /user/profile: the caller's profile with their addresses.
#[tracing::instrument(skip(state, principal))]
pub async fn profile<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
) -> Result<Json<ProfileEnvelope>, ApiError> {
    let profile = state.shop.buyer_profile(principal).await?;
    let addresses = state.shop.addresses(principal).await?;
    Ok(Json(ProfileEnvelope {
        message: None,
        profile: ProfileResponse::from(&profile),
        addresses: Some(addresses.into_iter().map(AddressResponse::from).collect()),
    }))
}

/// POST /user/profile: partial upsert.
#[tracing::instrument(skip(state, principal, req))]
pub async fn update_profile<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Authenticated(principal): Authenticated,
    JsonBody(req): JsonBody<ProfileBody>,
) -> Result<Json<ProfileEnvelope>, ApiError> {
    let profile = state
        .shop
        .update_buyer_profile(principal, req.into_patch())
        .await?;
    Ok(Json(ProfileEnvelope {
        message: Some("Profile updated successfully"),
        profile: ProfileResponse::from(&profile),
        addresses: None,
    }))
}

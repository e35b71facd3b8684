//! HTTP handlers and the extractors they share.

pub mod accounts;
pub mod admin;
pub mod cart;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod seller;

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use event_store::EventStore;
use serde::de::DeserializeOwned;
use services::{AuthProvider, Principal, ServiceError, Storefront};
use uuid::Uuid;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore + Clone + 'static> {
    pub shop: Storefront<S>,
    pub auth: Arc<dyn AuthProvider>,
}

impl<S: EventStore + Clone + 'static> AppState<S> {
    pub fn new(shop: Storefront<S>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { shop, auth }
    }
}

/// The caller, resolved from `Authorization: Bearer <token>`.
pub struct Authenticated(pub Principal);

impl<S: EventStore + Clone + 'static> FromRequestParts<Arc<AppState<S>>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ServiceError::Unauthenticated)?;

        let principal = state
            .auth
            .current_user(token)
            .await
            .ok_or(ServiceError::Unauthenticated)?;
        Ok(Authenticated(principal))
    }
}

/// JSON body whose rejections render as API errors.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

/// Parses an identifier from a path segment or body field.
pub(crate) fn parse_id<T: From<Uuid>>(raw: &str, what: &str) -> Result<T, ApiError> {
    Uuid::parse_str(raw.trim())
        .map(T::from)
        .map_err(|_| ApiError::bad_request(format!("Invalid {what}")))
}

/// Parses a required identifier, failing with `missing` when absent.
pub(crate) fn require_id<T: From<Uuid>>(
    raw: Option<&str>,
    what: &str,
    missing: &str,
) -> Result<T, ApiError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => parse_id(raw, what),
        None => Err(ApiError::bad_request(missing)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::OrderId;

    #[test]
    fn ids_parse_or_explain() {
        let id = OrderId::new();
        let parsed: OrderId = parse_id(&id.to_string(), "order id").unwrap();
        assert_eq!(parsed, id);

        let err = parse_id::<OrderId>("nope", "order id").unwrap_err();
        assert_eq!(err.to_string(), "Invalid order id");

        let err = require_id::<OrderId>(Some("  "), "order id", "Order ID is required").unwrap_err();
        assert_eq!(err.to_string(), "Order ID is required");
    }
}

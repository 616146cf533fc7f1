//! Admin identity extraction.
//!
//! Authentication happens upstream; the gateway forwards the verified admin
//! account id in the `x-admin-id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

/// Header carrying the authenticated admin account id.
pub const ADMIN_ID_HEADER: &str = "x-admin-id";

/// Authenticated admin extracted from [`ADMIN_ID_HEADER`].
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub admin_id: String,
}

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin_id = parts
            .headers
            .get(ADMIN_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing admin identity"))?;

        Ok(AdminUser {
            admin_id: admin_id.to_string(),
        })
    }
}

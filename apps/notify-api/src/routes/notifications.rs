//! Push subscription endpoints used by the admin dashboard.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use tavola_common::PushSubscriptionInfo;

use crate::auth::middleware::AdminUser;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::models::push_subscription::PushSubscription;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications/config", get(get_config))
        .route("/notifications/subscribe", post(subscribe))
        .route("/notifications/unsubscribe", post(unsubscribe))
}

// ---------------------------------------------------------------------------
// GET /notifications/config
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushConfigResponse {
    pub vapid_public_key: String,
}

#[utoipa::path(
    get,
    path = "/notifications/config",
    tag = "Notifications",
    responses(
        (status = 200, description = "VAPID public key for PushManager.subscribe", body = PushConfigResponse),
        (status = 503, description = "Push not configured", body = ApiErrorBody),
    ),
)]
pub async fn get_config(State(state): State<AppState>) -> Result<Json<PushConfigResponse>, ApiError> {
    let vapid = state
        .config
        .vapid
        .as_ref()
        .ok_or_else(ApiError::push_not_configured)?;

    Ok(Json(PushConfigResponse {
        vapid_public_key: vapid.public_key.clone(),
    }))
}

// ---------------------------------------------------------------------------
// POST /notifications/subscribe
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    /// `PushSubscription.toJSON()` from the browser.
    #[schema(value_type = Object)]
    pub subscription: PushSubscriptionInfo,
}

#[utoipa::path(
    post,
    path = "/notifications/subscribe",
    tag = "Notifications",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscription stored", body = PushSubscription),
        (status = 400, description = "Invalid subscription", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 503, description = "Push not configured", body = ApiErrorBody),
    ),
)]
pub async fn subscribe(
    AdminUser { admin_id }: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<PushSubscription>), ApiError> {
    if !state.dispatcher.is_enabled() {
        return Err(ApiError::push_not_configured());
    }

    validate_subscription(&body.subscription)?;

    let subscription = state.dispatcher.subscribe(&body.subscription, &admin_id).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

fn validate_subscription(info: &PushSubscriptionInfo) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    match reqwest::Url::parse(&info.endpoint) {
        Ok(url) if url.scheme() == "https" || url.scheme() == "http" => {}
        _ => errors.push(FieldError {
            field: "subscription.endpoint".to_string(),
            message: "must be an absolute http(s) URL".to_string(),
        }),
    }

    for (field, value) in [
        ("subscription.keys.p256dh", &info.keys.p256dh),
        ("subscription.keys.auth", &info.keys.auth),
    ] {
        if !is_base64url(value) {
            errors.push(FieldError {
                field: field.to_string(),
                message: "must be a non-empty base64url string".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(errors))
    }
}

fn is_base64url(value: &str) -> bool {
    let trimmed = value.trim_end_matches('=');
    !trimmed.is_empty()
        && trimmed
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

// ---------------------------------------------------------------------------
// POST /notifications/unsubscribe
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

#[utoipa::path(
    post,
    path = "/notifications/unsubscribe",
    tag = "Notifications",
    request_body = UnsubscribeRequest,
    responses(
        (status = 204, description = "Subscription removed (or never existed)"),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn unsubscribe(
    AdminUser { admin_id }: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<UnsubscribeRequest>,
) -> Result<StatusCode, ApiError> {
    let removed = state.dispatcher.unsubscribe(&body.endpoint).await?;
    tracing::debug!(%admin_id, endpoint = %body.endpoint, removed, "unsubscribe requested");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tavola_common::SubscriptionKeys;

    fn info(endpoint: &str, p256dh: &str, auth: &str) -> PushSubscriptionInfo {
        PushSubscriptionInfo {
            endpoint: endpoint.to_string(),
            keys: SubscriptionKeys {
                p256dh: p256dh.to_string(),
                auth: auth.to_string(),
            },
            expiration_time: None,
        }
    }

    #[test]
    fn accepts_browser_subscription() {
        let ok = info(
            "https://fcm.googleapis.com/fcm/send/abc:123",
            "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM",
            "tBHItJI5svbpez7KI4CCXg",
        );
        assert!(validate_subscription(&ok).is_ok());
    }

    #[test]
    fn rejects_bad_endpoint_and_keys() {
        let err = validate_subscription(&info("not a url", "", "a+b/c")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let fields: Vec<String> = err.details.unwrap().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "subscription.endpoint",
                "subscription.keys.p256dh",
                "subscription.keys.auth"
            ]
        );
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(validate_subscription(&info("ftp://push.example/1", "BPk", "tBH")).is_err());
    }
}

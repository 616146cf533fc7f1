//! Producer ingress: order management posts domain events here.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::events::{EventKind, OrderSummary};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/internal/events", post(publish_event))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishRequest {
    pub kind: EventKind,
    /// Order summary; must contain `orderId`.
    #[schema(value_type = Object)]
    pub payload: OrderSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublishResponse {
    /// Listeners that accepted the event.
    pub listeners: usize,
}

#[utoipa::path(
    post,
    path = "/internal/events",
    tag = "Events",
    request_body = PublishRequest,
    responses(
        (status = 202, description = "Event published", body = PublishResponse),
    ),
)]
pub async fn publish_event(
    State(state): State<AppState>,
    Json(body): Json<PublishRequest>,
) -> (StatusCode, Json<PublishResponse>) {
    tracing::debug!(kind = %body.kind, order_id = %body.payload.order_id, "order event received");
    let listeners = state.bus.publish(body.kind, body.payload);
    (StatusCode::ACCEPTED, Json(PublishResponse { listeners }))
}

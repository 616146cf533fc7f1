pub mod health;
pub mod notifications;
pub mod publish;

use axum::Router;
use utoipa::OpenApi;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(notifications::router())
        .merge(publish::router())
        .merge(crate::sse::server::router())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Notifications
        notifications::get_config,
        notifications::subscribe,
        notifications::unsubscribe,
        // Events
        crate::sse::server::stream_events,
        publish::publish_event,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            // Models
            crate::models::push_subscription::PushSubscription,
            crate::events::EventKind,
            // Route request/response types
            health::HealthResponse,
            notifications::PushConfigResponse,
            notifications::SubscribeRequest,
            notifications::UnsubscribeRequest,
            publish::PublishRequest,
            publish::PublishResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Notifications", description = "Web Push subscriptions"),
        (name = "Events", description = "Order event stream and ingress"),
    )
)]
pub struct ApiDoc;

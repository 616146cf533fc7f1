#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderName;
use axum::Router;
use parking_lot::Mutex;

use notify_api::config::{Config, VapidConfig};
use notify_api::models::push_subscription::PushSubscription;
use notify_api::push::sender::{classify_status, PushError, PushMessage, PushSender};
use notify_api::push::store::{MemorySubscriptionStore, SubscriptionStore};
use notify_api::AppState;
use tavola_common::NotificationPayload;

/// A throwaway public key in the shape browsers expect.
pub const TEST_VAPID_PUBLIC_KEY: &str =
    "BEl62iUYgUivxIkv69yViEuiBIa-Ib9-SkvMeAtA3LFgDzkrxZJjSgSnfckjBJuBkr3qBUYIHBQFLXYp5Nksh8U";

pub fn admin_header() -> HeaderName {
    HeaderName::from_static(notify_api::auth::middleware::ADMIN_ID_HEADER)
}

pub fn test_config(with_vapid: bool) -> Config {
    Config {
        port: 0,
        database_url: None,
        vapid: with_vapid.then(|| VapidConfig {
            public_key: TEST_VAPID_PUBLIC_KEY.to_string(),
            private_key: "IQ9Ur0ykXoHS9gzfYX0aBjy9lvdrjx_PFUXmie9YRcY".to_string(),
            subject: "mailto:test@tavola.local".to_string(),
        }),
        push_ttl_secs: 60,
        max_listeners_per_event: 10,
    }
}

/// Records pushes instead of calling a push service. Endpoints ending in
/// `/gone` answer 410.
#[derive(Default)]
pub struct RecordingPushSender {
    pub sent: Mutex<Vec<(String, NotificationPayload)>>,
}

#[async_trait]
impl PushSender for RecordingPushSender {
    async fn send(&self, subscription: &PushSubscription, message: &PushMessage) -> Result<(), PushError> {
        if subscription.endpoint.ends_with("/gone") {
            return classify_status(410);
        }
        let payload: NotificationPayload =
            serde_json::from_slice(&message.payload).map_err(|e| PushError::Payload(e.to_string()))?;
        self.sent.lock().push((subscription.endpoint.clone(), payload));
        Ok(())
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<MemorySubscriptionStore>,
    pub pushes: Arc<RecordingPushSender>,
}

/// Build the full router over an in-memory store and a recording sender.
pub fn test_app(with_vapid: bool) -> TestApp {
    let store = Arc::new(MemorySubscriptionStore::new());
    let pushes = Arc::new(RecordingPushSender::default());

    let sender: Option<Arc<dyn PushSender>> = if with_vapid {
        Some(pushes.clone())
    } else {
        None
    };
    let store_dyn: Arc<dyn SubscriptionStore> = store.clone();

    let (state, _worker) =
        AppState::with_sender(test_config(with_vapid), store_dyn, sender).expect("wire bus");
    let app = notify_api::routes::router().with_state(state.clone());

    TestApp {
        app,
        state,
        store,
        pushes,
    }
}

pub fn subscription_json(endpoint: &str, auth: &str) -> serde_json::Value {
    serde_json::json!({
        "subscription": {
            "endpoint": endpoint,
            "expirationTime": null,
            "keys": {
                "p256dh": "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM",
                "auth": auth
            }
        }
    })
}

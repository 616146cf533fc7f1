//! Sending one encrypted message to one push service endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use web_push::{
    ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushMessage, WebPushMessageBuilder, URL_SAFE_NO_PAD,
};

use crate::config::VapidConfig;
use crate::models::push_subscription::PushSubscription;

pub use web_push::Urgency;

/// Push service request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// A serialized notification ready for encryption.
#[derive(Debug, Clone)]
pub struct PushMessage {
    pub payload: Vec<u8>,
    /// Seconds the push service may hold the message for an offline browser.
    pub ttl: u32,
    pub urgency: Urgency,
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The subscription expired or was revoked (404/410).
    #[error("subscription gone (status {0})")]
    Gone(u16),
    #[error("push service rejected message (status {0})")]
    Rejected(u16),
    #[error("push request failed: {0}")]
    Transport(String),
    #[error("could not build push message: {0}")]
    Payload(String),
    #[error("vapid signing failed: {0}")]
    Vapid(String),
}

impl PushError {
    /// Whether the subscription should be deleted.
    pub fn is_permanent(&self) -> bool {
        matches!(self, PushError::Gone(_))
    }
}

/// Map a push service response status to a delivery outcome.
pub fn classify_status(status: u16) -> Result<(), PushError> {
    match status {
        200..=299 => Ok(()),
        404 | 410 => Err(PushError::Gone(status)),
        _ => Err(PushError::Rejected(status)),
    }
}

/// Delivers a message to a single subscription.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, subscription: &PushSubscription, message: &PushMessage) -> Result<(), PushError>;
}

/// Web Push sender: aes128gcm payload encryption and VAPID signing via
/// `web-push`, HTTP delivery via `reqwest`.
pub struct WebPushSender {
    http: reqwest::Client,
    private_key: String,
    subject: String,
}

impl WebPushSender {
    pub fn new(vapid: &VapidConfig) -> Result<Self, PushError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PushError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            private_key: vapid.private_key.clone(),
            subject: vapid.subject.clone(),
        })
    }

    fn build(&self, subscription: &PushSubscription, message: &PushMessage) -> Result<WebPushMessage, PushError> {
        let info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.keys.p256dh,
            &subscription.keys.auth,
        );

        let mut signature = VapidSignatureBuilder::from_base64(&self.private_key, URL_SAFE_NO_PAD, &info)
            .map_err(|e| PushError::Vapid(e.to_string()))?;
        signature.add_claim("sub", self.subject.as_str());
        let signature = signature.build().map_err(|e| PushError::Vapid(e.to_string()))?;

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, &message.payload);
        builder.set_ttl(message.ttl);
        builder.set_urgency(message.urgency);
        builder.set_vapid_signature(signature);
        builder.build().map_err(|e| PushError::Payload(e.to_string()))
    }
}

#[async_trait]
impl PushSender for WebPushSender {
    async fn send(&self, subscription: &PushSubscription, message: &PushMessage) -> Result<(), PushError> {
        let built = self.build(subscription, message)?;

        let mut request = self
            .http
            .post(built.endpoint.to_string())
            .header("TTL", built.ttl.to_string())
            .header("Urgency", built.urgency.unwrap_or(message.urgency).to_string());

        request = match built.payload {
            Some(payload) => {
                let mut request = request
                    .header(CONTENT_ENCODING, payload.content_encoding.to_str())
                    .header(CONTENT_TYPE, "application/octet-stream");
                for (name, value) in payload.crypto_headers {
                    request = request.header(name, value);
                }
                request.body(payload.content)
            }
            None => request.header(CONTENT_LENGTH, "0"),
        };

        let response = request
            .send()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        classify_status(response.status().as_u16())
    }
}

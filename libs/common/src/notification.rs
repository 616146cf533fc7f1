//! Wire types shared by the notification server and the browser agent.

use serde::{Deserialize, Serialize};

/// Largest plaintext the aes128gcm encryptor accepts. The encrypted record
/// (plaintext plus header, padding delimiter and tag) then stays under the
/// 4096-byte body limit push services enforce.
pub const MAX_PAYLOAD_BYTES: usize = 3052;

/// Default icon shown on order notifications.
pub const DEFAULT_ICON: &str = "/icons/icon-192x192.png";

/// Default monochrome badge shown on order notifications.
pub const DEFAULT_BADGE: &str = "/icons/badge-72x72.png";

/// Opaque data carried by a notification and handed back on click.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// A button rendered on an OS notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// The JSON body of a push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_badge")]
    pub badge: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub data: NotificationData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_badge() -> String {
    DEFAULT_BADGE.to_string()
}

impl NotificationPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            icon: default_icon(),
            badge: default_badge(),
            image: None,
            data: NotificationData::default(),
            tag: None,
            actions: Vec::new(),
        }
    }

    /// Serialize to JSON bytes no larger than `limit`.
    ///
    /// Optional presentation fields are dropped first (image, then actions),
    /// after which the body is truncated on a char boundary. Returns `None`
    /// when even an empty body does not fit.
    pub fn to_bytes_within(&self, limit: usize) -> Option<Vec<u8>> {
        let mut candidate = self.clone();
        if let Some(bytes) = encode_within(&candidate, limit) {
            return Some(bytes);
        }

        candidate.image = None;
        if let Some(bytes) = encode_within(&candidate, limit) {
            return Some(bytes);
        }

        candidate.actions.clear();
        if let Some(bytes) = encode_within(&candidate, limit) {
            return Some(bytes);
        }

        let chars: Vec<char> = self.body.chars().collect();
        let (mut lo, mut hi) = (0usize, chars.len());
        let mut best = None;
        // Binary search the longest body prefix that still fits.
        while lo <= hi {
            let mid = (lo + hi) / 2;
            let mut body: String = chars[..mid].iter().collect();
            body.push('…');
            candidate.body = body;
            match encode_within(&candidate, limit) {
                Some(bytes) => {
                    best = Some(bytes);
                    lo = mid + 1;
                }
                None if mid == 0 => break,
                None => hi = mid - 1,
            }
        }
        best
    }
}

fn encode_within(payload: &NotificationPayload, limit: usize) -> Option<Vec<u8>> {
    serde_json::to_vec(payload)
        .ok()
        .filter(|bytes| bytes.len() <= limit)
}

/// Public key material of a browser push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A browser push subscription as produced by `PushSubscription.toJSON()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscriptionInfo {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<f64>,
}

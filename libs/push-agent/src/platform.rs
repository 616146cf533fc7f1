//! Browser APIs the agent depends on.
//!
//! Futures are `?Send`: browser APIs are single-threaded.

use async_trait::async_trait;

use tavola_common::{NotificationData, NotificationPayload, PushSubscriptionInfo};

use crate::error::PlatformError;

/// `Notification.permission`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// No decision yet (or the prompt was dismissed).
    Default,
    Granted,
    Denied,
}

/// Notification permission API of the page.
#[async_trait(?Send)]
pub trait NotificationPermissions {
    fn permission(&self) -> Permission;

    /// Show the browser permission prompt.
    async fn request_permission(&self) -> Permission;
}

/// `ServiceWorkerRegistration.pushManager`.
#[async_trait(?Send)]
pub trait PushManager {
    async fn get_subscription(&self) -> Result<Option<PushSubscriptionInfo>, PlatformError>;

    /// Subscribe with `userVisibleOnly: true` and the raw application server key.
    async fn subscribe(&self, application_server_key: &[u8]) -> Result<PushSubscriptionInfo, PlatformError>;

    /// Returns `false` when there was no subscription.
    async fn unsubscribe(&self) -> Result<bool, PlatformError>;
}

/// `ServiceWorkerRegistration.showNotification`.
#[async_trait(?Send)]
pub trait NotificationDisplay {
    async fn show_notification(&self, payload: &NotificationPayload) -> Result<(), PlatformError>;
}

/// A notification the user interacted with.
pub trait ShownNotification {
    fn data(&self) -> NotificationData;

    fn close(&self);
}

/// A window client as returned by `clients.matchAll({ type: "window" })`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: String,
    /// Absolute URL of the document.
    pub url: String,
}

/// `self.clients` in the service worker.
#[async_trait(?Send)]
pub trait WindowClients {
    /// All window clients, including uncontrolled ones.
    async fn match_all(&self) -> Vec<WindowClient>;

    async fn focus(&self, client_id: &str) -> Result<(), PlatformError>;

    /// `clients.openWindow`, `url` relative to the worker scope origin.
    async fn open_window(&self, url: &str) -> Result<(), PlatformError>;
}

//! Service worker handlers: push rendering and notification clicks.

use reqwest::Url;
use serde_json::{Map, Value};

use tavola_common::routes::admin_order_url;
use tavola_common::{NotificationAction, NotificationPayload};

use crate::error::PlatformError;
use crate::platform::{NotificationDisplay, ShownNotification, WindowClients};

const FALLBACK_TITLE: &str = "Tavola";
const FALLBACK_BODY: &str = "You have a new notification";

/// Action id of the dismiss button.
pub const DISMISS_ACTION: &str = "dismiss";

/// Decode a push message body.
///
/// JSON objects are read field by field, so a missing or mistyped field falls
/// back to its default without losing the rest. Bodies that are not JSON
/// become a generic notification carrying the raw text.
pub fn notification_from_push(data: Option<&[u8]>) -> NotificationPayload {
    let Some(data) = data.filter(|d| !d.is_empty()) else {
        return NotificationPayload::new(FALLBACK_TITLE, FALLBACK_BODY);
    };

    match serde_json::from_slice::<Value>(data) {
        Ok(Value::Object(fields)) => payload_from_fields(&fields),
        Ok(Value::String(text)) => NotificationPayload::new(FALLBACK_TITLE, non_blank_or_default(text)),
        Ok(other) => NotificationPayload::new(FALLBACK_TITLE, other.to_string()),
        Err(err) => {
            tracing::debug!(error = %err, "push body is not JSON, showing raw text");
            let text = String::from_utf8_lossy(data).into_owned();
            NotificationPayload::new(FALLBACK_TITLE, non_blank_or_default(text))
        }
    }
}

fn payload_from_fields(fields: &Map<String, Value>) -> NotificationPayload {
    let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);

    let mut payload = NotificationPayload::new(
        text("title").unwrap_or_else(|| FALLBACK_TITLE.to_string()),
        text("body").unwrap_or_else(|| FALLBACK_BODY.to_string()),
    );
    if let Some(icon) = text("icon") {
        payload.icon = icon;
    }
    if let Some(badge) = text("badge") {
        payload.badge = badge;
    }
    payload.image = text("image");
    payload.tag = text("tag");
    payload.data.order_id = fields.get("data").and_then(|d| d.get("orderId")).and_then(|id| match id {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    });
    payload.actions = fields
        .get("actions")
        .cloned()
        .and_then(|actions| serde_json::from_value::<Vec<NotificationAction>>(actions).ok())
        .unwrap_or_default();
    payload
}

fn non_blank_or_default(text: String) -> String {
    if text.trim().is_empty() {
        FALLBACK_BODY.to_string()
    } else {
        text
    }
}

/// What a notification click led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Dismissed,
    /// An open window already showed the target and was focused.
    Focused(String),
    Opened(String),
}

pub struct ServiceWorkerHandler<D, C> {
    display: D,
    clients: C,
}

impl<D, C> ServiceWorkerHandler<D, C>
where
    D: NotificationDisplay,
    C: WindowClients,
{
    pub fn new(display: D, clients: C) -> Self {
        Self { display, clients }
    }

    /// `push` event.
    pub async fn on_push(&self, data: Option<&[u8]>) -> Result<(), PlatformError> {
        let payload = notification_from_push(data);
        self.display.show_notification(&payload).await
    }

    /// `notificationclick` event. `action` is empty for a click on the body.
    pub async fn on_notification_click(
        &self,
        notification: &dyn ShownNotification,
        action: &str,
    ) -> Result<ClickOutcome, PlatformError> {
        notification.close();
        if action == DISMISS_ACTION {
            return Ok(ClickOutcome::Dismissed);
        }

        let target = admin_order_url(notification.data().order_id.as_deref());

        for client in self.clients.match_all().await {
            if shows_destination(&client.url, &target) {
                self.clients.focus(&client.id).await?;
                return Ok(ClickOutcome::Focused(client.id));
            }
        }

        self.clients.open_window(&target).await?;
        Ok(ClickOutcome::Opened(target))
    }
}

/// Whether an open window at `client_url` already shows `target` (a path
/// with query). Query values are compared decoded.
fn shows_destination(client_url: &str, target: &str) -> bool {
    let Ok(open) = Url::parse(client_url) else {
        return false;
    };
    let Ok(wanted) = open.join(target) else {
        return false;
    };
    open.path() == wanted.path() && query_pairs(&open) == query_pairs(&wanted)
}

fn query_pairs(url: &Url) -> Vec<(String, String)> {
    url.query_pairs().into_owned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::WindowClient;
    use async_trait::async_trait;
    use std::cell::{Cell, RefCell};
    use tavola_common::NotificationData;

    #[derive(Default)]
    struct FakeDisplay {
        shown: RefCell<Vec<NotificationPayload>>,
    }

    #[async_trait(?Send)]
    impl NotificationDisplay for FakeDisplay {
        async fn show_notification(&self, payload: &NotificationPayload) -> Result<(), PlatformError> {
            self.shown.borrow_mut().push(payload.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeClients {
        windows: Vec<WindowClient>,
        focused: RefCell<Vec<String>>,
        opened: RefCell<Vec<String>>,
    }

    #[async_trait(?Send)]
    impl WindowClients for FakeClients {
        async fn match_all(&self) -> Vec<WindowClient> {
            self.windows.clone()
        }

        async fn focus(&self, client_id: &str) -> Result<(), PlatformError> {
            self.focused.borrow_mut().push(client_id.to_string());
            Ok(())
        }

        async fn open_window(&self, url: &str) -> Result<(), PlatformError> {
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }
    }

    struct FakeNotification {
        order_id: Option<&'static str>,
        closed: Cell<bool>,
    }

    impl FakeNotification {
        fn for_order(order_id: Option<&'static str>) -> Self {
            Self {
                order_id,
                closed: Cell::new(false),
            }
        }
    }

    impl ShownNotification for FakeNotification {
        fn data(&self) -> NotificationData {
            NotificationData {
                order_id: self.order_id.map(str::to_string),
            }
        }

        fn close(&self) {
            self.closed.set(true);
        }
    }

    fn window(id: &str, url: &str) -> WindowClient {
        WindowClient {
            id: id.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn json_push_is_decoded() {
        let body = br#"{"title":"New order","body":"Order #42 from Ada","data":{"orderId":"42"},"tag":"order-42"}"#;
        let payload = notification_from_push(Some(body));

        assert_eq!(payload.title, "New order");
        assert_eq!(payload.data.order_id.as_deref(), Some("42"));
        assert_eq!(payload.icon, tavola_common::notification::DEFAULT_ICON);
    }

    #[test]
    fn plain_text_push_falls_back_to_generic() {
        let payload = notification_from_push(Some(b"Kitchen printer offline"));
        assert_eq!(payload.title, FALLBACK_TITLE);
        assert_eq!(payload.body, "Kitchen printer offline");
        assert!(payload.data.order_id.is_none());
    }

    #[test]
    fn json_without_title_keeps_body_and_order() {
        let payload = notification_from_push(Some(br#"{"body":"Order #5 ready","data":{"orderId":"5"}}"#));
        assert_eq!(payload.title, FALLBACK_TITLE);
        assert_eq!(payload.body, "Order #5 ready");
        assert_eq!(payload.data.order_id.as_deref(), Some("5"));
    }

    #[test]
    fn mistyped_fields_fall_back_individually() {
        let payload = notification_from_push(Some(
            br#"{"title":"New order","body":42,"data":{"orderId":7},"actions":"view"}"#,
        ));
        assert_eq!(payload.title, "New order");
        assert_eq!(payload.body, FALLBACK_BODY);
        assert_eq!(payload.data.order_id.as_deref(), Some("7"));
        assert!(payload.actions.is_empty());
    }

    #[test]
    fn empty_push_uses_generic_text() {
        assert_eq!(notification_from_push(None).body, FALLBACK_BODY);
        assert_eq!(notification_from_push(Some(b"")).body, FALLBACK_BODY);
    }

    #[tokio::test]
    async fn on_push_shows_notification() {
        let handler = ServiceWorkerHandler::new(FakeDisplay::default(), FakeClients::default());
        handler.on_push(Some(b"{\"title\":\"t\",\"body\":\"b\"}")).await.unwrap();

        let shown = handler.display.shown.borrow();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].body, "b");
    }

    #[tokio::test]
    async fn click_without_matching_tab_opens_order_view() {
        let clients = FakeClients {
            windows: vec![window("w1", "https://shop.example.com/admin/orders")],
            ..FakeClients::default()
        };
        let handler = ServiceWorkerHandler::new(FakeDisplay::default(), clients);
        let notification = FakeNotification::for_order(Some("99"));

        let outcome = handler.on_notification_click(&notification, "").await.unwrap();

        assert_eq!(outcome, ClickOutcome::Opened("/admin/orders?orderId=99".to_string()));
        assert!(notification.closed.get());
        assert_eq!(*handler.clients.opened.borrow(), vec!["/admin/orders?orderId=99"]);
        assert!(handler.clients.focused.borrow().is_empty());
    }

    #[tokio::test]
    async fn click_focuses_tab_already_on_target() {
        let clients = FakeClients {
            windows: vec![
                window("w1", "https://shop.example.com/admin/menu"),
                window("w2", "https://shop.example.com/admin/orders?orderId=7"),
            ],
            ..FakeClients::default()
        };
        let handler = ServiceWorkerHandler::new(FakeDisplay::default(), clients);

        let outcome = handler
            .on_notification_click(&FakeNotification::for_order(Some("7")), "view")
            .await
            .unwrap();

        assert_eq!(outcome, ClickOutcome::Focused("w2".to_string()));
        assert!(handler.clients.opened.borrow().is_empty());
    }

    #[tokio::test]
    async fn click_matches_tab_with_encoded_order_id() {
        let clients = FakeClients {
            windows: vec![window("w1", "https://shop.example.com/admin/orders?orderId=a%26b%20%231")],
            ..FakeClients::default()
        };
        let handler = ServiceWorkerHandler::new(FakeDisplay::default(), clients);

        let outcome = handler
            .on_notification_click(&FakeNotification::for_order(Some("a&b #1")), "")
            .await
            .unwrap();
        assert_eq!(outcome, ClickOutcome::Focused("w1".to_string()));
    }

    #[tokio::test]
    async fn click_with_special_order_id_opens_encoded_url() {
        let handler = ServiceWorkerHandler::new(FakeDisplay::default(), FakeClients::default());

        let outcome = handler
            .on_notification_click(&FakeNotification::for_order(Some("a&b")), "")
            .await
            .unwrap();
        assert_eq!(outcome, ClickOutcome::Opened("/admin/orders?orderId=a%26b".to_string()));
    }

    #[tokio::test]
    async fn click_without_order_targets_orders_list() {
        let clients = FakeClients {
            windows: vec![window("w1", "https://shop.example.com/admin/orders")],
            ..FakeClients::default()
        };
        let handler = ServiceWorkerHandler::new(FakeDisplay::default(), clients);

        let outcome = handler
            .on_notification_click(&FakeNotification::for_order(None), "")
            .await
            .unwrap();
        assert_eq!(outcome, ClickOutcome::Focused("w1".to_string()));
    }

    #[tokio::test]
    async fn dismiss_action_only_closes() {
        let handler = ServiceWorkerHandler::new(FakeDisplay::default(), FakeClients::default());
        let notification = FakeNotification::for_order(Some("3"));

        let outcome = handler
            .on_notification_click(&notification, DISMISS_ACTION)
            .await
            .unwrap();

        assert_eq!(outcome, ClickOutcome::Dismissed);
        assert!(notification.closed.get());
        assert!(handler.clients.opened.borrow().is_empty());
    }
}

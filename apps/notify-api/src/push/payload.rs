//! Builds the push notification shown for an order event.

use tavola_common::{NotificationAction, NotificationPayload};

use crate::events::{DomainEvent, EventKind};

use super::sender::Urgency;

/// Title, body, tag and actions for an order event.
pub fn build_notification(event: &DomainEvent) -> NotificationPayload {
    let order = &event.payload;
    let (title, body) = match event.kind {
        EventKind::NotificationNew => {
            let mut body = format!("Order #{}", order.display_ref());
            if let Some(customer) = order.customer_name.as_deref().filter(|c| !c.is_empty()) {
                body.push_str(&format!(" from {customer}"));
            }
            ("New order", body)
        }
        EventKind::NotificationUpdate => {
            let mut body = format!("Order #{}", order.display_ref());
            if let Some(status) = order.status.as_deref().filter(|s| !s.is_empty()) {
                body.push_str(&format!(" is now {status}"));
            } else {
                body.push_str(" was updated");
            }
            ("Order updated", body)
        }
    };

    let mut payload = NotificationPayload::new(title, body);
    payload.data.order_id = Some(order.order_id.clone());
    payload.tag = Some(format!("order-{}", order.order_id));
    payload.actions = vec![
        NotificationAction {
            action: "view".to_string(),
            title: "View order".to_string(),
            icon: None,
        },
        NotificationAction {
            action: "dismiss".to_string(),
            title: "Dismiss".to_string(),
            icon: None,
        },
    ];
    payload
}

/// New orders need the kitchen's attention right away.
pub fn urgency_for(kind: EventKind) -> Urgency {
    match kind {
        EventKind::NotificationNew => Urgency::High,
        EventKind::NotificationUpdate => Urgency::Normal,
    }
}

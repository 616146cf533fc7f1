//! Order domain events and the in-process bus that fans them out.

pub mod bus;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// The notification event kinds raised by order management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum EventKind {
    #[serde(rename = "notification:new")]
    NotificationNew,
    #[serde(rename = "notification:update")]
    NotificationUpdate,
}

impl EventKind {
    pub const ALL: [EventKind; 2] = [EventKind::NotificationNew, EventKind::NotificationUpdate];

    /// Wire name used as the SSE `event:` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NotificationNew => "notification:new",
            EventKind::NotificationUpdate => "notification:update",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of an order as handed over by the producer.
///
/// Fields the pipeline does not interpret are kept in `extra` so SSE clients
/// receive the producer's summary unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrderSummary {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            order_number: None,
            status: None,
            customer_name: None,
            store_name: None,
            total: None,
            item_count: None,
            extra: Map::new(),
        }
    }

    /// Human-facing order reference: the order number when known.
    pub fn display_ref(&self) -> &str {
        self.order_number.as_deref().unwrap_or(&self.order_id)
    }
}

/// An immutable "order changed" event in flight through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    pub kind: EventKind,
    pub payload: OrderSummary,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(kind: EventKind, payload: OrderSummary) -> Self {
        Self {
            kind,
            payload,
            occurred_at: Utc::now(),
        }
    }
}

//! Registry of open event streams and fan-out of bus events to them.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use crate::events::bus::{EventListener, ListenerError};
use crate::events::{DomainEvent, EventKind};

use super::transport::{SseFrame, SseTransport};

/// Shared registry of live SSE connections, keyed per connection (a user
/// with two tabs has two entries).
pub struct SseBroadcaster {
    connections: DashMap<String, Arc<dyn SseTransport>>,
}

impl Default for SseBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl SseBroadcaster {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a connection and flush an initial empty frame to it.
    ///
    /// An existing connection with the same id is closed and replaced.
    pub fn register_connection(&self, client_id: impl Into<String>, transport: Arc<dyn SseTransport>) {
        let client_id = client_id.into();

        if let Err(err) = transport.send(SseFrame::Comment(String::new())) {
            tracing::debug!(%client_id, error = %err, "initial sse frame failed, not registering");
            let _ = transport.close();
            return;
        }

        if let Some(previous) = self.connections.insert(client_id.clone(), transport) {
            tracing::warn!(%client_id, "sse client id reused, closing previous connection");
            let _ = previous.close();
        }

        tracing::debug!(%client_id, connections = self.connections.len(), "sse connection registered");
    }

    /// Close and forget a connection. Unknown ids are ignored.
    pub fn unregister_connection(&self, client_id: &str) {
        if let Some((_, transport)) = self.connections.remove(client_id) {
            let _ = transport.close();
            tracing::debug!(%client_id, connections = self.connections.len(), "sse connection removed");
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_connected(&self, client_id: &str) -> bool {
        self.connections.contains_key(client_id)
    }

    /// Write an event frame to every connection. Connections whose write
    /// fails are pruned; the rest still receive the frame.
    ///
    /// Returns the number of connections the frame was written to.
    pub fn broadcast<T: Serialize>(&self, kind: EventKind, payload: &T) -> Result<usize, serde_json::Error> {
        let data = serde_json::to_string(payload)?;
        let frame = SseFrame::Event {
            event: kind.as_str().to_string(),
            data,
        };

        // Snapshot handles so pruning never runs under a shard lock.
        let targets: Vec<(String, Arc<dyn SseTransport>)> = self
            .connections
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut delivered = 0;
        for (client_id, transport) in targets {
            match transport.send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::debug!(%client_id, %kind, error = %err, "sse write failed, pruning connection");
                    // Only remove the entry if it was not replaced meanwhile.
                    let removed = self
                        .connections
                        .remove_if(&client_id, |_, current| Arc::ptr_eq(current, &transport));
                    if removed.is_some() {
                        let _ = transport.close();
                    }
                }
            }
        }

        Ok(delivered)
    }

    /// Close every connection. Used at shutdown.
    pub fn close_all(&self) {
        let ids: Vec<String> = self.connections.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.unregister_connection(&id);
        }
    }
}

impl EventListener for SseBroadcaster {
    fn name(&self) -> &str {
        "sse-broadcaster"
    }

    fn on_event(&self, event: &DomainEvent) -> Result<(), ListenerError> {
        let delivered = self.broadcast(event.kind, &event.payload)?;
        tracing::debug!(kind = %event.kind, order_id = %event.payload.order_id, delivered, "sse broadcast");
        Ok(())
    }
}

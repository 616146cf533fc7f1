//! Process-wide publish/subscribe hub for order notification events.
//!
//! Producers call [`EventBus::publish`]; the SSE broadcaster and the push
//! dispatcher register as listeners. Delivery is synchronous and in
//! registration order. Every listener invocation is isolated: an error or a
//! panic is logged and the remaining listeners still run.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{DomainEvent, EventKind, OrderSummary};

/// Default cap on listeners per event kind. Hitting it usually means
/// listeners are being added without a matching removal.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// Error type a listener may return. Logged, never propagated.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Something that reacts to published domain events.
pub trait EventListener: Send + Sync {
    /// Name used in log lines.
    fn name(&self) -> &str {
        "listener"
    }

    fn on_event(&self, event: &DomainEvent) -> Result<(), ListenerError>;
}

/// Adapter turning a closure into an [`EventListener`].
pub struct FnListener<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a named listener.
pub fn listener_fn<F>(name: impl Into<String>, f: F) -> FnListener<F>
where
    F: Fn(&DomainEvent) -> Result<(), ListenerError> + Send + Sync,
{
    FnListener {
        name: name.into(),
        f,
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&DomainEvent) -> Result<(), ListenerError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&self, event: &DomainEvent) -> Result<(), ListenerError> {
        (self.f)(event)
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BusError {
    #[error("listener limit of {max} reached for {kind}")]
    ListenerLimit { kind: EventKind, max: usize },
}

struct Registered {
    id: ListenerId,
    listener: Arc<dyn EventListener>,
}

pub struct EventBus {
    listeners: RwLock<HashMap<EventKind, Vec<Registered>>>,
    max_listeners: usize,
    next_id: AtomicU64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LISTENERS)
    }
}

impl EventBus {
    pub fn new(max_listeners: usize) -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            max_listeners,
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener for `kind`.
    ///
    /// Fails once `kind` already has `max_listeners` registrations.
    pub fn subscribe(
        &self,
        kind: EventKind,
        listener: Arc<dyn EventListener>,
    ) -> Result<ListenerId, BusError> {
        let mut map = self.listeners.write();
        let slots = map.entry(kind).or_default();
        if slots.len() >= self.max_listeners {
            tracing::error!(
                %kind,
                max = self.max_listeners,
                listener = listener.name(),
                "listener limit reached, possible subscription leak"
            );
            return Err(BusError::ListenerLimit {
                kind,
                max: self.max_listeners,
            });
        }

        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%kind, listener = listener.name(), "listener registered");
        slots.push(Registered { id, listener });
        Ok(id)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut map = self.listeners.write();
        let Some(slots) = map.get_mut(&kind) else {
            return false;
        };
        let before = slots.len();
        slots.retain(|r| r.id != id);
        before != slots.len()
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.read().get(&kind).map_or(0, Vec::len)
    }

    /// Publish an order event. Returns how many listeners handled it
    /// without error.
    pub fn publish(&self, kind: EventKind, payload: OrderSummary) -> usize {
        self.publish_event(&DomainEvent::new(kind, payload))
    }

    pub fn publish_event(&self, event: &DomainEvent) -> usize {
        // Snapshot so listeners can (un)subscribe while being invoked.
        let snapshot: Vec<Arc<dyn EventListener>> = match self.listeners.read().get(&event.kind) {
            Some(slots) => slots.iter().map(|r| r.listener.clone()).collect(),
            None => return 0,
        };

        let mut handled = 0;
        for listener in snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event))) {
                Ok(Ok(())) => handled += 1,
                Ok(Err(err)) => {
                    tracing::warn!(
                        kind = %event.kind,
                        listener = listener.name(),
                        error = %err,
                        "event listener failed"
                    );
                }
                Err(_) => {
                    tracing::error!(
                        kind = %event.kind,
                        listener = listener.name(),
                        "event listener panicked"
                    );
                }
            }
        }
        handled
    }
}

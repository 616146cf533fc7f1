//! Push Dispatcher: delivers every order event to all stored subscriptions.
//!
//! The bus listener only enqueues; a background worker does the network
//! work so publishing never waits on a push service. Deliveries for one event
//! run concurrently and fail independently. A 404/410 from the push service
//! deletes that subscription, anything else is logged and dropped.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tavola_common::notification::MAX_PAYLOAD_BYTES;
use tavola_common::PushSubscriptionInfo;

use crate::events::bus::{EventListener, ListenerError};
use crate::events::DomainEvent;
use crate::models::push_subscription::PushSubscription;

use super::payload::{build_notification, urgency_for};
use super::sender::{PushMessage, PushSender};
use super::store::{StoreError, SubscriptionStore};

/// Outcome counts of a single dispatch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub pruned: usize,
    pub failed: usize,
}

enum Outcome {
    Delivered,
    Pruned,
    Failed,
}

pub struct PushDispatcher {
    store: Arc<dyn SubscriptionStore>,
    /// `None` when no VAPID keys are configured.
    sender: Option<Arc<dyn PushSender>>,
    ttl: u32,
}

impl PushDispatcher {
    pub fn new(store: Arc<dyn SubscriptionStore>, sender: Option<Arc<dyn PushSender>>, ttl: u32) -> Self {
        Self { store, sender, ttl }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Upsert a subscription keyed by its endpoint.
    pub async fn subscribe(&self, info: &PushSubscriptionInfo, owner_id: &str) -> Result<PushSubscription, StoreError> {
        let subscription = self.store.upsert(info, owner_id).await?;
        tracing::info!(endpoint = %subscription.endpoint, %owner_id, "push subscription stored");
        Ok(subscription)
    }

    /// Delete a subscription. Unknown endpoints are a no-op.
    pub async fn unsubscribe(&self, endpoint: &str) -> Result<bool, StoreError> {
        let removed = self.store.remove(endpoint).await?;
        if removed {
            tracing::info!(%endpoint, "push subscription removed");
        }
        Ok(removed)
    }

    pub async fn subscription_count(&self) -> Result<usize, StoreError> {
        self.store.count().await
    }

    /// Deliver `event` to every subscription stored at the time of the call.
    pub async fn dispatch(&self, event: &DomainEvent) -> DispatchReport {
        let Some(sender) = self.sender.as_ref() else {
            tracing::debug!(kind = %event.kind, "push not configured, skipping dispatch");
            return DispatchReport::default();
        };

        // Snapshot first: pruning during delivery must not disturb iteration.
        let subscriptions = match self.store.list().await {
            Ok(subs) => subs,
            Err(err) => {
                tracing::error!(error = %err, "failed to load push subscriptions");
                return DispatchReport::default();
            }
        };
        if subscriptions.is_empty() {
            return DispatchReport::default();
        }

        let notification = build_notification(event);
        let Some(payload) = notification.to_bytes_within(MAX_PAYLOAD_BYTES) else {
            tracing::warn!(order_id = %event.payload.order_id, "push payload exceeds size limit");
            return DispatchReport::default();
        };
        let message = PushMessage {
            payload,
            ttl: self.ttl,
            urgency: urgency_for(event.kind),
        };

        let outcomes = join_all(
            subscriptions
                .iter()
                .map(|sub| self.deliver(sender.as_ref(), sub, &message)),
        )
        .await;

        let mut report = DispatchReport::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Delivered => report.delivered += 1,
                Outcome::Pruned => report.pruned += 1,
                Outcome::Failed => report.failed += 1,
            }
        }

        tracing::info!(
            kind = %event.kind,
            order_id = %event.payload.order_id,
            delivered = report.delivered,
            pruned = report.pruned,
            failed = report.failed,
            "push dispatch finished"
        );
        report
    }

    async fn deliver(&self, sender: &dyn PushSender, subscription: &PushSubscription, message: &PushMessage) -> Outcome {
        match sender.send(subscription, message).await {
            Ok(()) => Outcome::Delivered,
            Err(err) if err.is_permanent() => {
                tracing::info!(endpoint = %subscription.endpoint, error = %err, "pruning expired push subscription");
                if let Err(store_err) = self.store.remove_stale(subscription).await {
                    tracing::warn!(endpoint = %subscription.endpoint, error = %store_err, "failed to prune push subscription");
                }
                Outcome::Pruned
            }
            Err(err) => {
                tracing::warn!(endpoint = %subscription.endpoint, error = %err, "push delivery failed");
                Outcome::Failed
            }
        }
    }

    /// Start the background worker and return the bus listener feeding it.
    ///
    /// The worker exits once every [`PushListener`] has been dropped.
    pub fn spawn_worker(self: Arc<Self>) -> (PushListener, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<DomainEvent>();
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                self.dispatch(&event).await;
            }
            tracing::debug!("push dispatch worker stopped");
        });
        (PushListener { tx }, handle)
    }
}

/// Bus listener that hands events to the dispatch worker.
#[derive(Clone)]
pub struct PushListener {
    tx: mpsc::UnboundedSender<DomainEvent>,
}

impl EventListener for PushListener {
    fn name(&self) -> &str {
        "push-dispatcher"
    }

    fn on_event(&self, event: &DomainEvent) -> Result<(), ListenerError> {
        self.tx
            .send(event.clone())
            .map_err(|_| "push dispatch worker is not running".into())
    }
}

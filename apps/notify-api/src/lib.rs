pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod push;
pub mod routes;
pub mod sse;

use std::sync::Arc;

use tokio::task::JoinHandle;

use config::Config;
use events::bus::{BusError, EventBus};
use events::EventKind;
use push::dispatcher::PushDispatcher;
use push::sender::{PushSender, WebPushSender};
use push::store::SubscriptionStore;
use sse::broadcaster::SseBroadcaster;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub bus: Arc<EventBus>,
    pub broadcaster: Arc<SseBroadcaster>,
    pub dispatcher: Arc<PushDispatcher>,
}

impl AppState {
    /// Build the pipeline and wire both delivery channels onto the bus.
    ///
    /// Must run inside a Tokio runtime; the returned handle is the push
    /// dispatch worker (absent when push is not configured).
    pub fn new(
        config: Config,
        store: Arc<dyn SubscriptionStore>,
    ) -> Result<(Self, Option<JoinHandle<()>>), BusError> {
        let sender: Option<Arc<dyn PushSender>> = match config.vapid.as_ref() {
            Some(vapid) => match WebPushSender::new(vapid) {
                Ok(sender) => Some(Arc::new(sender)),
                Err(err) => {
                    tracing::error!(error = %err, "failed to build push client, push disabled");
                    None
                }
            },
            None => {
                tracing::warn!("VAPID keys not configured, push notifications disabled");
                None
            }
        };

        Self::with_sender(config, store, sender)
    }

    /// Like [`AppState::new`] with an explicit push sender.
    pub fn with_sender(
        config: Config,
        store: Arc<dyn SubscriptionStore>,
        sender: Option<Arc<dyn PushSender>>,
    ) -> Result<(Self, Option<JoinHandle<()>>), BusError> {
        let bus = Arc::new(EventBus::new(config.max_listeners_per_event));
        let broadcaster = Arc::new(SseBroadcaster::new());
        let dispatcher = Arc::new(PushDispatcher::new(store, sender, config.push_ttl_secs));

        for kind in EventKind::ALL {
            bus.subscribe(kind, broadcaster.clone())?;
        }

        let worker = if dispatcher.is_enabled() {
            let (listener, worker) = dispatcher.clone().spawn_worker();
            let listener = Arc::new(listener);
            for kind in EventKind::ALL {
                bus.subscribe(kind, listener.clone())?;
            }
            Some(worker)
        } else {
            None
        };

        let state = Self {
            config: Arc::new(config),
            bus,
            broadcaster,
            dispatcher,
        };
        Ok((state, worker))
    }
}

//! Browser-side delivery of order notifications.
//!
//! [`agent::PushAgent`] runs in the dashboard page and drives the
//! permission/subscription lifecycle. [`worker::ServiceWorkerHandler`] runs in
//! the service worker and turns push messages into OS notifications and
//! notification clicks into dashboard navigation. Browser APIs are reached
//! through the traits in [`platform`]; every handler is an `async fn` the host
//! glue passes to `ExtendableEvent.waitUntil` so the worker stays alive until
//! it completes.

pub mod agent;
pub mod error;
pub mod key;
pub mod platform;
pub mod server;
pub mod worker;

pub use agent::{AgentState, PushAgent};
pub use error::{AgentError, PlatformError};
pub use worker::{ClickOutcome, ServiceWorkerHandler};

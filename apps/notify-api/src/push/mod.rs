//! Web Push delivery to stored browser subscriptions.

pub mod dispatcher;
pub mod payload;
pub mod sender;
pub mod store;

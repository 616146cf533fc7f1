//! Server-Sent Events delivery to open admin dashboard tabs.

pub mod broadcaster;
pub mod server;
pub mod transport;

pub mod id;
pub mod notification;
pub mod routes;

pub use id::ClientId;
pub use notification::{
    NotificationAction, NotificationData, NotificationPayload, PushSubscriptionInfo,
    SubscriptionKeys,
};

/// Failure reported by a browser API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{api}: {message}")]
pub struct PlatformError {
    pub api: &'static str,
    pub message: String,
}

impl PlatformError {
    pub fn new(api: &'static str, message: impl Into<String>) -> Self {
        Self {
            api,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The server has no VAPID key; the UI shows push as unavailable.
    #[error("push notifications are not configured on the server")]
    NotConfigured,
    #[error("invalid application server key: {0}")]
    InvalidKey(String),
    #[error("server request failed: {0}")]
    Server(String),
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

use crate::events::bus::DEFAULT_MAX_LISTENERS;

/// Default time-to-live handed to push services (one day).
const DEFAULT_PUSH_TTL_SECS: u32 = 86_400;

/// VAPID application server keys used to sign push messages.
#[derive(Debug, Clone)]
pub struct VapidConfig {
    /// URL-safe base64 uncompressed P-256 public key, shared with browsers.
    pub public_key: String,
    /// URL-safe base64 raw P-256 private key.
    pub private_key: String,
    /// Contact URI placed in the VAPID `sub` claim.
    pub subject: String,
}

/// Notification service configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// PostgreSQL connection string. Subscriptions stay in memory when unset.
    pub database_url: Option<String>,
    /// Push signing keys. Push delivery is disabled when unset.
    pub vapid: Option<VapidConfig>,
    /// TTL in seconds for push messages.
    pub push_ttl_secs: u32,
    /// Listener cap per event kind on the bus.
    pub max_listeners_per_event: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: parsed_var("PORT").unwrap_or(4003),
            database_url: optional_var("DATABASE_URL"),
            vapid: vapid_from_env(),
            push_ttl_secs: parsed_var("PUSH_TTL_SECS").unwrap_or(DEFAULT_PUSH_TTL_SECS),
            max_listeners_per_event: parsed_var("MAX_LISTENERS_PER_EVENT").unwrap_or(DEFAULT_MAX_LISTENERS),
        }
    }
}

fn vapid_from_env() -> Option<VapidConfig> {
    let public_key = optional_var("VAPID_PUBLIC_KEY");
    let private_key = optional_var("VAPID_PRIVATE_KEY");
    match (public_key, private_key) {
        (Some(public_key), Some(private_key)) => Some(VapidConfig {
            public_key,
            private_key,
            subject: optional_var("VAPID_SUBJECT").unwrap_or_else(|| "mailto:admin@tavola.local".to_string()),
        }),
        (None, None) => None,
        _ => {
            tracing::warn!("only one of VAPID_PUBLIC_KEY / VAPID_PRIVATE_KEY is set, push disabled");
            None
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

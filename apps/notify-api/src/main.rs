use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notify_api::config::Config;
use notify_api::db::pool;
use notify_api::push::store::{MemorySubscriptionStore, PgSubscriptionStore, SubscriptionStore};
use notify_api::AppState;

/// Time allowed for queued push deliveries at shutdown.
const SHUTDOWN_DRAIN_SECS: u64 = 5;

#[tokio::main]
async fn main() {
    // Load .env from cwd, falling back to the crate dir; env vars may be set externally.
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let port = config.port;

    let store: Arc<dyn SubscriptionStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = pool::connect(url).expect("failed to build connection pool");
            Arc::new(PgSubscriptionStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, push subscriptions are kept in memory");
            Arc::new(MemorySubscriptionStore::new())
        }
    };

    let (state, worker) = AppState::new(config, store).expect("failed to wire event bus");

    tracing::info!(push_enabled = state.dispatcher.is_enabled(), "notify-api configured");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(notify_api::routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "notify-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    let broadcaster = state.broadcaster.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested, closing event streams");
            // Open SSE streams would otherwise hold the server open.
            broadcaster.close_all();
        })
        .await
        .expect("server error");

    // Dropping the last bus handle lets the push worker drain its queue.
    drop(state);
    if let Some(worker) = worker {
        if tokio::time::timeout(Duration::from_secs(SHUTDOWN_DRAIN_SECS), worker)
            .await
            .is_err()
        {
            tracing::warn!("push worker did not drain in time");
        }
    }
    tracing::info!("notify-api stopped");
}

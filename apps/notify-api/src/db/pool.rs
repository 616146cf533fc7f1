use diesel_async::pooled_connection::deadpool::{BuildError, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

pub type DbPool = Pool<AsyncPgConnection>;

/// Subscriptions see low write volume; a small pool is enough.
const MAX_CONNECTIONS: usize = 8;

/// Build the subscription store's connection pool. Connections are opened
/// lazily, so an unreachable database surfaces on first use.
pub fn connect(database_url: &str) -> Result<DbPool, BuildError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder(manager).max_size(MAX_CONNECTIONS).build()?;
    tracing::info!(max_connections = MAX_CONNECTIONS, "subscription store pool created");
    Ok(pool)
}

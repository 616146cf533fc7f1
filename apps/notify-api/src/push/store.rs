//! Durable push subscriptions, keyed by endpoint.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use diesel::prelude::*;

use tavola_common::PushSubscriptionInfo;

use crate::db::pool::DbPool;
use crate::db::schema::push_subscriptions;
use crate::models::push_subscription::{NewPushSubscription, PushSubscription, PushSubscriptionRow};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
}

/// Storage for push subscriptions.
///
/// Implementations only need atomic single-row insert/remove; callers
/// snapshot with [`SubscriptionStore::list`] before iterating.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert or overwrite the subscription for `info.endpoint`.
    async fn upsert(&self, info: &PushSubscriptionInfo, owner_id: &str) -> Result<PushSubscription, StoreError>;

    /// Delete by endpoint. Returns whether a record existed.
    async fn remove(&self, endpoint: &str) -> Result<bool, StoreError>;

    /// Delete `subscription` only if the stored record still carries the
    /// same keys. A re-subscription that replaced it in the meantime is kept.
    async fn remove_stale(&self, subscription: &PushSubscription) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<PushSubscription>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (no DATABASE_URL / tests)
// ---------------------------------------------------------------------------

pub struct MemorySubscriptionStore {
    data: DashMap<String, PushSubscription>,
}

impl Default for MemorySubscriptionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }
}

#[async_trait]
impl SubscriptionStore for MemorySubscriptionStore {
    async fn upsert(&self, info: &PushSubscriptionInfo, owner_id: &str) -> Result<PushSubscription, StoreError> {
        let mut entry = self
            .data
            .entry(info.endpoint.clone())
            .or_insert_with(|| PushSubscription {
                endpoint: info.endpoint.clone(),
                keys: info.keys.clone(),
                owner_id: owner_id.to_string(),
                created_at: Utc::now(),
            });
        entry.keys = info.keys.clone();
        entry.owner_id = owner_id.to_string();
        Ok(entry.clone())
    }

    async fn remove(&self, endpoint: &str) -> Result<bool, StoreError> {
        Ok(self.data.remove(endpoint).is_some())
    }

    async fn remove_stale(&self, subscription: &PushSubscription) -> Result<bool, StoreError> {
        let removed = self
            .data
            .remove_if(&subscription.endpoint, |_, current| current.keys == subscription.keys);
        Ok(removed.is_some())
    }

    async fn list(&self) -> Result<Vec<PushSubscription>, StoreError> {
        let mut subs: Vec<PushSubscription> = self.data.iter().map(|e| e.value().clone()).collect();
        subs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(subs)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.data.len())
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL implementation
// ---------------------------------------------------------------------------

pub struct PgSubscriptionStore {
    db: DbPool,
}

impl PgSubscriptionStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn upsert(&self, info: &PushSubscriptionInfo, owner_id: &str) -> Result<PushSubscription, StoreError> {
        let mut conn = self.db.get().await?;

        let row: PushSubscriptionRow = diesel_async::RunQueryDsl::get_result(
            diesel::insert_into(push_subscriptions::table)
                .values(NewPushSubscription {
                    endpoint: &info.endpoint,
                    p256dh: &info.keys.p256dh,
                    auth: &info.keys.auth,
                    owner_id,
                })
                .on_conflict(push_subscriptions::endpoint)
                .do_update()
                .set((
                    push_subscriptions::p256dh.eq(&info.keys.p256dh),
                    push_subscriptions::auth.eq(&info.keys.auth),
                    push_subscriptions::owner_id.eq(owner_id),
                    push_subscriptions::updated_at.eq(diesel::dsl::now),
                ))
                .returning(PushSubscriptionRow::as_returning()),
            &mut conn,
        )
        .await?;

        Ok(row.into())
    }

    async fn remove(&self, endpoint: &str) -> Result<bool, StoreError> {
        let mut conn = self.db.get().await?;

        let deleted = diesel_async::RunQueryDsl::execute(
            diesel::delete(push_subscriptions::table.filter(push_subscriptions::endpoint.eq(endpoint))),
            &mut conn,
        )
        .await?;

        Ok(deleted > 0)
    }

    async fn remove_stale(&self, subscription: &PushSubscription) -> Result<bool, StoreError> {
        let mut conn = self.db.get().await?;

        let deleted = diesel_async::RunQueryDsl::execute(
            diesel::delete(
                push_subscriptions::table
                    .filter(push_subscriptions::endpoint.eq(&subscription.endpoint))
                    .filter(push_subscriptions::p256dh.eq(&subscription.keys.p256dh))
                    .filter(push_subscriptions::auth.eq(&subscription.keys.auth)),
            ),
            &mut conn,
        )
        .await?;

        Ok(deleted > 0)
    }

    async fn list(&self) -> Result<Vec<PushSubscription>, StoreError> {
        let mut conn = self.db.get().await?;

        let rows: Vec<PushSubscriptionRow> = diesel_async::RunQueryDsl::load(
            push_subscriptions::table
                .order(push_subscriptions::created_at.asc())
                .select(PushSubscriptionRow::as_select()),
            &mut conn,
        )
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let mut conn = self.db.get().await?;

        let count: i64 = diesel_async::RunQueryDsl::get_result(
            push_subscriptions::table.count(),
            &mut conn,
        )
        .await?;

        Ok(count as usize)
    }
}

use crate::entities::cache_entity as cache;
use crate::error::{AppError, AppResult};
use crate::utils::Clock;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage for serialized Edge responses.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the entry unless it is missing or expired at `now`.
    async fn get(&self, cid: &str, now: DateTime<Utc>) -> AppResult<Option<String>>;

    async fn set(
        &self,
        cid: &str,
        data: String,
        tags: &[String],
        expire: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    async fn delete(&self, cid: &str) -> AppResult<()>;

    /// Drops every entry carrying at least one of `tags`.
    async fn invalidate_tags(&self, tags: &[String]) -> AppResult<u64>;

    /// Drops entries that expired before `now`.
    async fn garbage_collect(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

// tags 以空格分隔并首尾补空格，便于 LIKE ' tag ' 精确匹配
fn encode_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        " ".to_string()
    } else {
        format!(" {} ", tags.join(" "))
    }
}

#[derive(Clone)]
pub struct DatabaseCacheBackend {
    pool: DatabaseConnection,
}

impl DatabaseCacheBackend {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheBackend for DatabaseCacheBackend {
    async fn get(&self, cid: &str, now: DateTime<Utc>) -> AppResult<Option<String>> {
        let row = cache::Entity::find_by_id(cid.to_string())
            .one(&self.pool)
            .await?;
        Ok(row
            .filter(|r| r.expire.is_none_or(|expire| expire > now))
            .map(|r| r.data))
    }

    async fn set(
        &self,
        cid: &str,
        data: String,
        tags: &[String],
        expire: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let model = cache::ActiveModel {
            cid: Set(cid.to_string()),
            data: Set(data),
            tags: Set(encode_tags(tags)),
            expire: Set(expire),
            created: Set(Utc::now()),
        };
        cache::Entity::insert(model)
            .on_conflict(
                OnConflict::column(cache::Column::Cid)
                    .update_columns([
                        cache::Column::Data,
                        cache::Column::Tags,
                        cache::Column::Expire,
                        cache::Column::Created,
                    ])
                    .to_owned(),
            )
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, cid: &str) -> AppResult<()> {
        cache::Entity::delete_by_id(cid.to_string())
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    async fn invalidate_tags(&self, tags: &[String]) -> AppResult<u64> {
        if tags.is_empty() {
            return Ok(0);
        }
        let condition = tags.iter().fold(Condition::any(), |cond, tag| {
            cond.add(cache::Column::Tags.contains(format!(" {tag} ")))
        });
        let res = cache::Entity::delete_many()
            .filter(condition)
            .exec(&self.pool)
            .await?;
        Ok(res.rows_affected)
    }

    async fn garbage_collect(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let res = cache::Entity::delete_many()
            .filter(cache::Column::Expire.lt(now))
            .exec(&self.pool)
            .await?;
        Ok(res.rows_affected)
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    data: String,
    tags: Vec<String>,
    expire: Option<DateTime<Utc>>,
}

/// Process-local backend, used when no database is configured.
#[derive(Clone, Default)]
pub struct MemoryCacheBackend {
    entries: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, cid: &str, now: DateTime<Utc>) -> AppResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(cid)
            .filter(|e| e.expire.is_none_or(|expire| expire > now))
            .map(|e| e.data.clone()))
    }

    async fn set(
        &self,
        cid: &str,
        data: String,
        tags: &[String],
        expire: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        self.entries.write().await.insert(
            cid.to_string(),
            MemoryEntry {
                data,
                tags: tags.to_vec(),
                expire,
            },
        );
        Ok(())
    }

    async fn delete(&self, cid: &str) -> AppResult<()> {
        self.entries.write().await.remove(cid);
        Ok(())
    }

    async fn invalidate_tags(&self, tags: &[String]) -> AppResult<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !e.tags.iter().any(|t| tags.contains(t)));
        Ok((before - entries.len()) as u64)
    }

    async fn garbage_collect(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.expire.is_none_or(|expire| expire > now));
        Ok((before - entries.len()) as u64)
    }
}

/// Read-through cache in front of the Edge client.
///
/// Backend failures are logged and treated as misses so that Edge stays the
/// source of truth. Two concurrent misses on the same id both call the loader.
#[derive(Clone)]
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
    clock: Arc<dyn Clock>,
    max_age: Duration,
}

impl CacheService {
    /// `max_age_secs == 0` disables caching.
    pub fn new(backend: Arc<dyn CacheBackend>, clock: Arc<dyn Clock>, max_age_secs: u64) -> Self {
        Self {
            backend,
            clock,
            max_age: Duration::seconds(max_age_secs as i64),
        }
    }

    pub async fn remember<T, F, Fut>(&self, cid: &str, tags: &[String], loader: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        if self.max_age.is_zero() {
            return loader().await;
        }

        let now = self.clock.now();
        match self.backend.get(cid, now).await {
            Ok(Some(data)) => match serde_json::from_str::<T>(&data) {
                Ok(value) => {
                    log::debug!("Cache hit: {cid}");
                    return Ok(value);
                }
                Err(e) => log::warn!("Discarding unreadable cache entry {cid}: {e}"),
            },
            Ok(None) => log::debug!("Cache miss: {cid}"),
            Err(e) => log::warn!("Cache read failed for {cid}: {e}"),
        }

        let value = loader().await?;
        match serde_json::to_string(&value) {
            Ok(data) => {
                if let Err(e) = self
                    .backend
                    .set(cid, data, tags, Some(now + self.max_age))
                    .await
                {
                    log::warn!("Cache write failed for {cid}: {e}");
                }
            }
            Err(e) => log::warn!("Cannot serialize cache entry {cid}: {e}"),
        }
        Ok(value)
    }

    pub async fn invalidate_tags(&self, tags: &[String]) -> AppResult<u64> {
        if tags.iter().any(|t| t.trim().is_empty() || t.contains(char::is_whitespace)) {
            return Err(AppError::ValidationError(
                "Cache tags must be non-empty and contain no whitespace".to_string(),
            ));
        }
        let removed = self.backend.invalidate_tags(tags).await?;
        log::info!("Invalidated {removed} cache entries for tags {tags:?}");
        Ok(removed)
    }

    /// Drops entries after a write to Edge has gone through.
    ///
    /// Failures are only logged: the write already happened and the stale
    /// entries expire on their own.
    pub async fn forget(&self, tags: &[String], cids: &[String]) {
        if !tags.is_empty() {
            match self.backend.invalidate_tags(tags).await {
                Ok(removed) => log::debug!("Invalidated {removed} cache entries for tags {tags:?}"),
                Err(e) => log::warn!("Cache invalidation failed for tags {tags:?}: {e}"),
            }
        }
        for cid in cids {
            if let Err(e) = self.backend.delete(cid).await {
                log::warn!("Cache delete failed for {cid}: {e}");
            }
        }
    }

    /// Removes expired entries, returning how many were dropped.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        self.backend.garbage_collect(self.clock.now()).await
    }
}

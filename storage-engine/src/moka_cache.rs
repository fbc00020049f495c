use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use shared::{BackendResult, TtlMs};
use std::fmt::Debug;
use std::time::{Duration, Instant};
use twincache::ports::CacheBackend;

#[derive(Clone, Debug)]
struct StoredValue {
    value: String,
    ttl: Option<Duration>,
}

/// Expires each entry after the ttl it was written with
struct PerEntryExpiry;

impl Expiry<String, StoredValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    // An upsert restarts the clock with the new entry's ttl
    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Moka-based in-process backend with per-entry TTL support
pub struct MokaCache {
    name: String,
    cache: Cache<String, StoredValue>,
    default_ttl: Option<Duration>,
}

impl MokaCache {
    /// Create a Moka backend with optional capacity and default TTL
    pub fn new(
        name: impl Into<String>,
        max_entries: Option<u64>,
        default_ttl: Option<Duration>,
    ) -> Self {
        let name = name.into();
        let mut builder = Cache::builder().name(&name).expire_after(PerEntryExpiry);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            name,
            cache: builder.build(),
            default_ttl,
        }
    }

    /// Create a new unbounded Moka backend with optional default TTL
    pub fn new_unbounded(default_ttl: Option<Duration>) -> Self {
        Self::new("memory", None, default_ttl)
    }
}

#[async_trait]
impl CacheBackend for MokaCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        // Expired entries are never returned
        Ok(self.cache.get(key).await.map(|stored| stored.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<TtlMs>) -> BackendResult<()> {
        let ttl = ttl
            .and_then(TtlMs::non_zero)
            .map(|t| t.as_duration())
            .or(self.default_ttl);

        self.cache
            .insert(
                key.to_string(),
                StoredValue {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn clear(&self) -> BackendResult<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    async fn ping(&self) -> BackendResult<()> {
        Ok(())
    }
}

impl Debug for MokaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCache")
            .field("name", &self.name)
            .field("entry_count", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

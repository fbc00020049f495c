use crate::domain::response::{LookupResponse, RemoveResponse, StoreResponse};
use async_trait::async_trait;
use shared::{Result, TtlMs};

/// Per-key cache operations across all backends
#[async_trait]
pub trait CacheOperations: Send + Sync + 'static {
    /// Resolve a key in backend precedence order. A miss is `Ok` with `found == false`.
    async fn lookup(&self, key: &str) -> Result<LookupResponse>;

    async fn store(&self, key: &str, value: &str, ttl: Option<TtlMs>) -> Result<StoreResponse>;

    async fn remove(&self, key: &str) -> Result<RemoveResponse>;
}

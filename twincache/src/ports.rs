use async_trait::async_trait;
use shared::config::BackendSpec;
use shared::{BackendResult, Result, TtlMs};
use std::sync::Arc;

// Ports are the pluggable extension points for the external cache stores

/// Port for creating backends from configuration
pub trait BackendFactory: Send + Sync + 'static {
    fn create_from_spec(&self, spec: &BackendSpec) -> Result<Arc<dyn CacheBackend>>;
}

/// Minimal capability set the coordinator needs from a cache store.
///
/// Implementations only translate to their wire protocol. `get` returns
/// `Ok(None)` for an absent key and reserves `Err` for communication
/// failures; `delete` of an absent key is `Ok`.
#[async_trait]
pub trait CacheBackend: Send + Sync + 'static {
    fn name(&self) -> &str;
    async fn get(&self, key: &str) -> BackendResult<Option<String>>;
    /// `None` uses the backend's configured default expiry
    async fn set(&self, key: &str, value: &str, ttl: Option<TtlMs>) -> BackendResult<()>;
    async fn delete(&self, key: &str) -> BackendResult<()>;
    async fn clear(&self) -> BackendResult<()>;
    async fn ping(&self) -> BackendResult<()>;
}

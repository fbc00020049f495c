use crate::memcached::MemcachedCache;
use crate::moka_cache::MokaCache;
use crate::redis_cache::RedisCache;
use shared::config::BackendSpec;
use shared::{Error, Result};
use std::sync::Arc;
use twincache::ports::{BackendFactory, CacheBackend};

/// Builds any supported backend from its configuration entry
pub struct UnifiedBackendFactory;

impl BackendFactory for UnifiedBackendFactory {
    fn create_from_spec(&self, spec: &BackendSpec) -> Result<Arc<dyn CacheBackend>> {
        let backend: Arc<dyn CacheBackend> = match spec {
            BackendSpec::Redis { url, default_ttl } => Arc::new(
                RedisCache::new(url, *default_ttl)
                    .map_err(|e| Error::Config(format!("redis backend: {}", e)))?,
            ),
            BackendSpec::Memcached {
                addr,
                default_ttl,
                pool_size,
            } => Arc::new(
                MemcachedCache::new(addr.clone(), *default_ttl, *pool_size)
                    .map_err(|e| Error::Config(format!("memcached backend: {}", e)))?,
            ),
            BackendSpec::Memory {
                max_entries,
                default_ttl,
            } => Arc::new(MokaCache::new("memory", *max_entries, *default_ttl)),
        };
        Ok(backend)
    }
}

/// Builds the ordered backend list, Primary first
pub fn create_backends(
    factory: &dyn BackendFactory,
    specs: &[BackendSpec],
) -> Result<Vec<Arc<dyn CacheBackend>>> {
    specs
        .iter()
        .map(|spec| factory.create_from_spec(spec))
        .collect()
}

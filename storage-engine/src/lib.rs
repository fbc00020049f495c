pub mod factory;
pub mod memcached;
pub mod moka_cache;
pub mod redis_cache;

pub use factory::{UnifiedBackendFactory, create_backends};
pub use memcached::MemcachedCache;
pub use moka_cache::MokaCache;
pub use redis_cache::RedisCache;

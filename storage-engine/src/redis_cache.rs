use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisError, RedisResult};
use shared::{BackendError, BackendResult, TtlMs};
use std::fmt::Debug;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use twincache::ports::CacheBackend;

/// Redis backend. The multiplexed connection is dialed on first use and
/// dropped after a connection-level failure so the next call re-dials.
pub struct RedisCache {
    name: String,
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
    default_ttl: Option<Duration>,
}

impl RedisCache {
    pub fn new(url: &str, default_ttl: Option<Duration>) -> BackendResult<Self> {
        let client =
            redis::Client::open(url).map_err(|e| BackendError::Connection(e.to_string()))?;

        Ok(Self {
            name: "redis".to_string(),
            client,
            connection: Mutex::new(None),
            default_ttl,
        })
    }

    async fn connection(&self) -> BackendResult<MultiplexedConnection> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(to_backend_error)?;
        debug!("Connected to Redis");
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Map a command result, forgetting the connection if it broke
    async fn settle<T>(&self, result: RedisResult<T>) -> BackendResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                let err = to_backend_error(err);
                if matches!(err, BackendError::Connection(_)) {
                    warn!("Dropping Redis connection after failure: {}", err);
                    self.connection.lock().await.take();
                }
                Err(err)
            }
        }
    }
}

fn to_backend_error(err: RedisError) -> BackendError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        BackendError::Connection(err.to_string())
    } else if err.kind() == redis::ErrorKind::TypeError {
        BackendError::Protocol(err.to_string())
    } else {
        BackendError::Command(err.to_string())
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let mut conn = self.connection().await?;
        let result = conn.get::<_, Option<String>>(key).await;
        self.settle(result).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<TtlMs>) -> BackendResult<()> {
        let mut conn = self.connection().await?;
        let ttl = ttl
            .and_then(TtlMs::non_zero)
            .map(|t| t.as_duration())
            .or(self.default_ttl);

        let result = match ttl {
            Some(ttl) => {
                let millis = ttl.as_millis() as u64;
                debug!(key = key, ttl_ms = millis, "Redis SET PX");
                conn.pset_ex::<_, _, ()>(key, value, millis).await
            }
            None => conn.set::<_, _, ()>(key, value).await,
        };
        self.settle(result).await
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        let mut conn = self.connection().await?;
        // DEL of a missing key returns 0, not an error
        let result = conn.del::<_, ()>(key).await;
        self.settle(result).await
    }

    async fn clear(&self) -> BackendResult<()> {
        let mut conn = self.connection().await?;
        let result: RedisResult<()> = redis::cmd("FLUSHDB").query_async(&mut conn).await;
        self.settle(result).await
    }

    async fn ping(&self) -> BackendResult<()> {
        let mut conn = self.connection().await?;
        let result: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        self.settle(result).await.map(|_| ())
    }
}

impl Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("name", &self.name)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

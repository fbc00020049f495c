pub mod codec;

use async_trait::async_trait;
use bytes::Bytes;
use codec::{Command, MemcachedCodec, Reply};
use deadpool::managed::{self, Metrics, Object, RecycleError, RecycleResult};
use futures::{SinkExt, StreamExt};
use shared::{BackendError, BackendResult, TtlMs};
use std::fmt::Debug;
use std::io;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, warn};
use twincache::ports::CacheBackend;

// Memcached reads larger exptime values as absolute unix timestamps
const MAX_RELATIVE_EXPTIME_SECS: u64 = 60 * 60 * 24 * 30;

/// A framed connection plus whether a request on it still awaits its reply
pub struct Connection {
    framed: Framed<TcpStream, MemcachedCodec>,
    in_flight: bool,
}

impl Connection {
    async fn round_trip(&mut self, command: Command) -> io::Result<Reply> {
        self.in_flight = true;
        self.framed.send(command).await?;
        let reply = match self.framed.next().await {
            Some(reply) => reply?,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed by server",
                ));
            }
        };
        self.in_flight = false;
        Ok(reply)
    }
}

/// Dials memcached connections for the pool
pub struct ConnectionManager {
    addr: String,
}

impl managed::Manager for ConnectionManager {
    type Type = Connection;
    type Error = io::Error;

    async fn create(&self) -> Result<Connection, io::Error> {
        let socket = TcpStream::connect(&self.addr).await?;
        socket.set_nodelay(true).ok();
        debug!("Connected to memcached at {}", self.addr);
        Ok(Connection {
            framed: Framed::new(socket, MemcachedCodec),
            in_flight: false,
        })
    }

    // A connection whose call failed or was cancelled part way may still have
    // an unread reply queued, so it is never handed out again
    async fn recycle(&self, conn: &mut Connection, _: &Metrics) -> RecycleResult<io::Error> {
        if conn.in_flight {
            return Err(RecycleError::Backend(io::Error::other(
                "connection has an unfinished round trip",
            )));
        }
        Ok(())
    }
}

type Pool = managed::Pool<ConnectionManager>;

/// Memcached backend speaking the text protocol over a pool of connections.
///
/// Each call checks a connection out for one request/reply round trip, so
/// concurrent calls run on separate connections.
pub struct MemcachedCache {
    name: String,
    addr: String,
    pool: Pool,
    default_ttl: Option<Duration>,
}

impl MemcachedCache {
    pub fn new(
        addr: impl Into<String>,
        default_ttl: Option<Duration>,
        pool_size: usize,
    ) -> BackendResult<Self> {
        let addr = addr.into();
        let manager = ConnectionManager { addr: addr.clone() };
        let pool = Pool::builder(manager)
            .max_size(pool_size.max(1))
            .build()
            .map_err(|e| BackendError::Connection(format!("memcached pool: {}", e)))?;

        Ok(Self {
            name: "memcached".to_string(),
            addr,
            pool,
            default_ttl,
        })
    }

    async fn call(&self, command: Command) -> BackendResult<Reply> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| BackendError::Connection(format!("{}: {}", self.addr, e)))?;

        match conn.round_trip(command).await {
            Ok(Reply::Error(msg)) => Err(BackendError::Command(msg)),
            Ok(reply) => Ok(reply),
            Err(e) => {
                warn!("Dropping memcached connection to {}: {}", self.addr, e);
                let _ = Object::take(conn);
                Err(match e.kind() {
                    io::ErrorKind::InvalidData => BackendError::Protocol(e.to_string()),
                    _ => BackendError::Connection(e.to_string()),
                })
            }
        }
    }
}

/// Translate a ttl into a memcached exptime. 0 means "never expires".
fn exptime(ttl: Option<Duration>) -> u32 {
    let Some(ttl) = ttl else {
        return 0;
    };

    // Whole seconds, rounded up so short ttls don't become "never"
    let secs = ttl.as_millis().div_ceil(1000).max(1) as u64;
    if secs <= MAX_RELATIVE_EXPTIME_SECS {
        return secs as u32;
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    now.saturating_add(secs).min(u32::MAX as u64) as u32
}

fn unexpected(command: &str, reply: Reply) -> BackendError {
    BackendError::Protocol(format!("unexpected reply to {}: {:?}", command, reply))
}

#[async_trait]
impl CacheBackend for MemcachedCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        match self.call(Command::Get { key: key.to_string() }).await? {
            Reply::Value(data) => String::from_utf8(data.to_vec())
                .map(Some)
                .map_err(|e| BackendError::Protocol(format!("value is not UTF-8: {}", e))),
            Reply::Miss => Ok(None),
            other => Err(unexpected("get", other)),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<TtlMs>) -> BackendResult<()> {
        let ttl = ttl
            .and_then(TtlMs::non_zero)
            .map(|t| t.as_duration())
            .or(self.default_ttl);

        let command = Command::Set {
            key: key.to_string(),
            value: Bytes::copy_from_slice(value.as_bytes()),
            exptime: exptime(ttl),
        };

        match self.call(command).await? {
            Reply::Stored => Ok(()),
            other => Err(unexpected("set", other)),
        }
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        match self.call(Command::Delete { key: key.to_string() }).await? {
            Reply::Deleted | Reply::NotFound => Ok(()),
            other => Err(unexpected("delete", other)),
        }
    }

    async fn clear(&self) -> BackendResult<()> {
        match self.call(Command::FlushAll).await? {
            Reply::Ok => Ok(()),
            other => Err(unexpected("flush_all", other)),
        }
    }

    async fn ping(&self) -> BackendResult<()> {
        match self.call(Command::Version).await? {
            Reply::Version(_) => Ok(()),
            other => Err(unexpected("version", other)),
        }
    }
}

impl Debug for MemcachedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemcachedCache")
            .field("addr", &self.addr)
            .field("pool", &self.pool.status())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

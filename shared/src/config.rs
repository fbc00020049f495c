use crate::{Error, Result};
use std::time::Duration;
use tracing::warn;

/// One entry of the ordered backend list. The first entry is the Primary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendSpec {
    Redis {
        url: String,
        default_ttl: Option<Duration>,
    },
    Memcached {
        addr: String,
        default_ttl: Option<Duration>,
        pool_size: usize,
    },
    Memory {
        max_entries: Option<u64>,
        default_ttl: Option<Duration>,
    },
}

impl BackendSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendSpec::Redis { .. } => "redis",
            BackendSpec::Memcached { .. } => "memcached",
            BackendSpec::Memory { .. } => "memory",
        }
    }
}

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub backends: Vec<BackendSpec>,
    pub backend_timeout: Option<Duration>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    const DEFAULT_HOST: &'static str = "127.0.0.1";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_BACKENDS: &'static str = "redis,memcached";
    const DEFAULT_REDIS_URL: &'static str = "redis://127.0.0.1:6379/0";
    const DEFAULT_MEMCACHED_ADDR: &'static str = "127.0.0.1:11211";
    const DEFAULT_MEMCACHED_POOL_SIZE: usize = 16;
    const DEFAULT_TTL_SECS: u64 = 60;
    const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 2000;

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("TWIN_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let http_port = parse_or(&lookup, "TWIN_HTTP_PORT", Self::DEFAULT_HTTP_PORT);

        let timeout_ms = parse_or(
            &lookup,
            "TWIN_BACKEND_TIMEOUT_MS",
            Self::DEFAULT_BACKEND_TIMEOUT_MS,
        );
        let backend_timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));

        let kinds = lookup("TWIN_BACKENDS").unwrap_or_else(|| Self::DEFAULT_BACKENDS.to_string());
        let backends = kinds
            .split(',')
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
            .map(|kind| Self::backend_spec(&lookup, kind))
            .collect::<Result<Vec<_>>>()?;

        if backends.is_empty() {
            return Err(Error::Config(
                "TWIN_BACKENDS must name at least one backend".to_string(),
            ));
        }

        Ok(Self {
            host,
            http_port,
            backends,
            backend_timeout,
            allowed_origins: lookup("TWIN_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        })
    }

    fn backend_spec<F>(lookup: &F, kind: &str) -> Result<BackendSpec>
    where
        F: Fn(&str) -> Option<String>,
    {
        match kind.to_lowercase().as_str() {
            "redis" => Ok(BackendSpec::Redis {
                url: lookup("TWIN_REDIS_URL")
                    .unwrap_or_else(|| Self::DEFAULT_REDIS_URL.to_string()),
                default_ttl: ttl_secs(lookup, "TWIN_REDIS_TTL_SECS"),
            }),
            "memcached" => Ok(BackendSpec::Memcached {
                addr: lookup("TWIN_MEMCACHED_ADDR")
                    .unwrap_or_else(|| Self::DEFAULT_MEMCACHED_ADDR.to_string()),
                default_ttl: ttl_secs(lookup, "TWIN_MEMCACHED_TTL_SECS"),
                pool_size: parse_or(
                    lookup,
                    "TWIN_MEMCACHED_POOL_SIZE",
                    Self::DEFAULT_MEMCACHED_POOL_SIZE,
                ),
            }),
            "memory" => Ok(BackendSpec::Memory {
                max_entries: lookup("TWIN_MEMORY_MAX_ENTRIES").and_then(|v| v.parse().ok()),
                default_ttl: ttl_secs(lookup, "TWIN_MEMORY_TTL_SECS"),
            }),
            other => Err(Error::Config(format!(
                "unknown backend kind '{}'. Must be 'redis', 'memcached', or 'memory'",
                other
            ))),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has unparsable value '{}', using default", name, raw);
            default
        }),
        None => default,
    }
}

// 0 disables the default expiry
fn ttl_secs<F>(lookup: &F, name: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = parse_or(lookup, name, Config::DEFAULT_TTL_SECS);
    (secs > 0).then(|| Duration::from_secs(secs))
}

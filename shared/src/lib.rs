// shared/src/lib.rs

use std::fmt;
use std::time::Duration;

/// Mutations the coordinator applies across backends
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Store,
    Remove,
    ClearAll,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Store => "store",
            Operation::Remove => "remove",
            Operation::ClearAll => "clear_all",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a single backend adapter
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("command rejected: {0}")]
    Command(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A backend failed part way through an operation. `applied` lists the
    /// backends that completed the operation before the failure.
    #[error("{backend} backend failed during {operation}: {source}")]
    Backend {
        backend: String,
        operation: Operation,
        #[source]
        source: BackendError,
        applied: Vec<String>,
    },
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    /// True when at least one backend already holds the result of a failed mutation
    pub fn is_partial(&self) -> bool {
        matches!(self, Error::Backend { applied, .. } if !applied.is_empty())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Per-entry time-to-live in milliseconds. Zero means "use the backend default".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtlMs(pub u64);

impl TtlMs {
    /// Drops a zero ttl so callers fall back to the backend default
    pub fn non_zero(self) -> Option<Self> {
        if self.0 == 0 { None } else { Some(self) }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl From<Duration> for TtlMs {
    fn from(duration: Duration) -> Self {
        TtlMs(duration.as_millis() as u64)
    }
}

pub mod config;

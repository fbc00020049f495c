use crate::ports::CacheBackend;
use shared::{BackendError, BackendResult, Error, Operation, Result, TtlMs};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// A mutating request, applied to every backend in order under the write lock
#[derive(Clone, Copy, Debug)]
pub(crate) enum Mutation<'a> {
    Store {
        key: &'a str,
        value: &'a str,
        ttl: Option<TtlMs>,
    },
    Remove {
        key: &'a str,
    },
    ClearAll,
}

impl Mutation<'_> {
    pub(crate) fn operation(&self) -> Operation {
        match self {
            Mutation::Store { .. } => Operation::Store,
            Mutation::Remove { .. } => Operation::Remove,
            Mutation::ClearAll => Operation::ClearAll,
        }
    }

    async fn dispatch(&self, backend: &dyn CacheBackend) -> BackendResult<()> {
        match *self {
            Mutation::Store { key, value, ttl } => backend.set(key, value, ttl).await,
            Mutation::Remove { key } => backend.delete(key).await,
            Mutation::ClearAll => backend.clear().await,
        }
    }
}

/// Write-through / read-fallback coordinator over an ordered list of backends.
///
/// Index 0 is the Primary. Reads go through the list until one backend has
/// the key; mutations are applied to every backend in order while holding a
/// single process-wide lock, stopping at the first failure. The coordinator
/// keeps no entry state of its own.
pub struct CacheCoordinator {
    backends: Vec<Arc<dyn CacheBackend>>,
    // Serializes Store, Remove and ClearAll. Lookup never takes it.
    write_lock: Mutex<()>,
    call_timeout: Option<Duration>,
}

impl CacheCoordinator {
    /// Create a coordinator over a Primary and a Secondary backend
    pub fn new(primary: Arc<dyn CacheBackend>, secondary: Arc<dyn CacheBackend>) -> Self {
        Self {
            backends: vec![primary, secondary],
            write_lock: Mutex::new(()),
            call_timeout: None,
        }
    }

    /// Create a coordinator over any number of backends, in precedence order
    pub fn with_backends(backends: Vec<Arc<dyn CacheBackend>>) -> Result<Self> {
        if backends.is_empty() {
            return Err(Error::Config(
                "coordinator needs at least one backend".to_string(),
            ));
        }

        Ok(Self {
            backends,
            write_lock: Mutex::new(()),
            call_timeout: None,
        })
    }

    /// Bound every individual backend call. `None` waits indefinitely.
    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub(crate) fn backends(&self) -> &[Arc<dyn CacheBackend>] {
        &self.backends
    }

    /// Run one backend call under the configured timeout
    pub(crate) async fn guarded<T, F>(&self, call: F) -> BackendResult<T>
    where
        F: Future<Output = BackendResult<T>>,
    {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| BackendError::Timeout(limit))?,
            None => call.await,
        }
    }

    /// Apply a mutation to every backend in order, holding the write lock
    /// until all calls have finished. Returns the backends that applied it.
    pub(crate) async fn apply_in_order(&self, mutation: Mutation<'_>) -> Result<Vec<String>> {
        let operation = mutation.operation();
        let _guard = self.write_lock.lock().await;

        let mut applied = Vec::with_capacity(self.backends.len());
        for backend in &self.backends {
            match self.guarded(mutation.dispatch(backend.as_ref())).await {
                Ok(()) => {
                    debug!("{} applied to {}", operation, backend.name());
                    applied.push(backend.name().to_string());
                }
                Err(source) => {
                    error!(
                        "{} failed on {} backend: {} (already applied to: {:?})",
                        operation,
                        backend.name(),
                        source,
                        applied
                    );
                    return Err(Error::Backend {
                        backend: backend.name().to_string(),
                        operation,
                        source,
                        applied,
                    });
                }
            }
        }

        Ok(applied)
    }
}

impl Debug for CacheCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCoordinator")
            .field("backends", &self.backend_names())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

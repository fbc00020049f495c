use crate::ports::CacheBackend;
use async_trait::async_trait;
use shared::{BackendError, BackendResult, TtlMs};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Ordered record of every call made against a set of fake backends
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// In-memory backend with failure injection
pub(crate) struct FakeBackend {
    name: String,
    entries: Mutex<HashMap<String, String>>,
    journal: Journal,
    unreachable: AtomicBool,
    reject_writes: AtomicBool,
    delay: Option<Duration>,
}

impl FakeBackend {
    pub(crate) fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            entries: Mutex::new(HashMap::new()),
            journal: journal.clone(),
            unreachable: AtomicBool::new(false),
            reject_writes: AtomicBool::new(false),
            delay: None,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub(crate) fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Seed an entry without going through the coordinator
    pub(crate) fn seed(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub(crate) fn value_of(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    async fn enter(&self, call: &str, write: bool) -> BackendResult<()> {
        self.journal.record(format!("{}:{}", self.name, call));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        if self.unreachable.load(Ordering::SeqCst) {
            return Err(BackendError::Connection(format!(
                "{} is unreachable",
                self.name
            )));
        }
        if write && self.reject_writes.load(Ordering::SeqCst) {
            return Err(BackendError::Command("SERVER_ERROR out of memory".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for FakeBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        self.enter(&format!("get:{}", key), false).await?;
        Ok(self.value_of(key))
    }

    async fn set(&self, key: &str, value: &str, _ttl: Option<TtlMs>) -> BackendResult<()> {
        self.enter(&format!("set:{}", key), true).await?;
        self.seed(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        self.enter(&format!("delete:{}", key), true).await?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn clear(&self) -> BackendResult<()> {
        self.enter("clear", true).await?;
        self.entries.lock().unwrap().clear();
        Ok(())
    }

    async fn ping(&self) -> BackendResult<()> {
        self.enter("ping", false).await
    }
}

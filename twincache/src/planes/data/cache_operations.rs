use crate::coordinator::{CacheCoordinator, Mutation};
use crate::domain::response::{LookupResponse, RemoveResponse, StoreResponse};
use crate::planes::data::operation::CacheOperations;
use crate::validation::validate_key;
use async_trait::async_trait;
use shared::{Result, TtlMs};
use tracing::{debug, warn};

#[async_trait]
impl CacheOperations for CacheCoordinator {
    /// Read path: the first backend that has the key wins. Misses and
    /// failures fall through to the next backend; nothing is written back.
    async fn lookup(&self, key: &str) -> Result<LookupResponse> {
        validate_key(key)?;

        let mut failed = 0;
        for backend in self.backends() {
            match self.guarded(backend.get(key)).await {
                Ok(Some(value)) => {
                    debug!("Returning '{}' from {}", key, backend.name());
                    return Ok(LookupResponse::hit(value, backend.name()));
                }
                Ok(None) => {
                    debug!("'{}' not in {}", key, backend.name());
                }
                Err(e) => {
                    warn!(
                        "Lookup of '{}' failed on {}, falling through: {}",
                        key,
                        backend.name(),
                        e
                    );
                    failed += 1;
                }
            }
        }

        // Backend errors on the read path still resolve to a miss
        if failed == self.backends().len() {
            warn!("Every backend failed looking up '{}', reporting a miss", key);
        }

        Ok(LookupResponse::miss())
    }

    async fn store(&self, key: &str, value: &str, ttl: Option<TtlMs>) -> Result<StoreResponse> {
        validate_key(key)?;

        let ttl = ttl.and_then(TtlMs::non_zero);
        let applied = self
            .apply_in_order(Mutation::Store { key, value, ttl })
            .await?;
        Ok(StoreResponse::new(applied))
    }

    async fn remove(&self, key: &str) -> Result<RemoveResponse> {
        validate_key(key)?;

        let applied = self.apply_in_order(Mutation::Remove { key }).await?;
        Ok(RemoveResponse::new(applied))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, Journal};
    use shared::{BackendError, Error, Operation};
    use std::sync::Arc;

    fn coordinator() -> (CacheCoordinator, Arc<FakeBackend>, Arc<FakeBackend>, Journal) {
        let journal = Journal::default();
        let primary = Arc::new(FakeBackend::new("redis", &journal));
        let secondary = Arc::new(FakeBackend::new("memcached", &journal));
        let coordinator = CacheCoordinator::new(primary.clone(), secondary.clone());
        (coordinator, primary, secondary, journal)
    }

    #[tokio::test]
    async fn test_lookup_absent_key_is_a_miss() {
        let (coordinator, _, _, _) = coordinator();

        let response = coordinator.lookup("user:404").await.unwrap();
        assert_eq!(response, LookupResponse::miss());
    }

    #[tokio::test]
    async fn test_read_after_write() {
        let (coordinator, primary, secondary, _) = coordinator();

        let stored = coordinator.store("user:1", "alice", None).await.unwrap();
        assert_eq!(stored.backends, vec!["redis", "memcached"]);
        assert_eq!(primary.value_of("user:1").as_deref(), Some("alice"));
        assert_eq!(secondary.value_of("user:1").as_deref(), Some("alice"));

        let response = coordinator.lookup("user:1").await.unwrap();
        assert_eq!(response, LookupResponse::hit("alice".to_string(), "redis"));
    }

    #[tokio::test]
    async fn test_primary_takes_precedence_on_divergence() {
        let (coordinator, primary, secondary, journal) = coordinator();
        primary.seed("k", "v1");
        secondary.seed("k", "v2");

        let response = coordinator.lookup("k").await.unwrap();
        assert_eq!(response.value.as_deref(), Some("v1"));

        // Short-circuit: the Secondary was never consulted
        assert_eq!(journal.entries(), vec!["redis:get:k"]);
    }

    #[tokio::test]
    async fn test_lookup_falls_back_when_primary_unreachable() {
        let (coordinator, primary, secondary, _) = coordinator();
        primary.seed("k", "stale");
        primary.set_unreachable(true);
        secondary.seed("k", "v");

        let response = coordinator.lookup("k").await.unwrap();
        assert_eq!(response, LookupResponse::hit("v".to_string(), "memcached"));
    }

    #[tokio::test]
    async fn test_lookup_falls_back_on_primary_miss_without_read_repair() {
        let (coordinator, primary, secondary, _) = coordinator();
        secondary.seed("k", "v");

        let response = coordinator.lookup("k").await.unwrap();
        assert_eq!(response.source.as_deref(), Some("memcached"));
        assert_eq!(primary.value_of("k"), None);
    }

    #[tokio::test]
    async fn test_lookup_with_one_failure_and_one_miss_is_a_miss() {
        let (coordinator, primary, _, _) = coordinator();
        primary.set_unreachable(true);

        let response = coordinator.lookup("k").await.unwrap();
        assert!(!response.found);
    }

    #[tokio::test]
    async fn test_lookup_with_every_backend_down_is_a_miss() {
        let (coordinator, primary, secondary, journal) = coordinator();
        primary.seed("k", "v");
        secondary.seed("k", "v");
        primary.set_unreachable(true);
        secondary.set_unreachable(true);

        let response = coordinator.lookup("k").await.unwrap();
        assert_eq!(response, LookupResponse::miss());
        assert_eq!(journal.entries(), vec!["redis:get:k", "memcached:get:k"]);
    }

    #[tokio::test]
    async fn test_remove_then_miss_and_remove_is_idempotent() {
        let (coordinator, _, _, _) = coordinator();
        coordinator.store("k", "v", None).await.unwrap();

        let removed = coordinator.remove("k").await.unwrap();
        assert_eq!(removed.backends, vec!["redis", "memcached"]);
        assert!(!coordinator.lookup("k").await.unwrap().found);

        assert!(coordinator.remove("k").await.is_ok());
    }

    #[tokio::test]
    async fn test_primary_store_failure_skips_secondary() {
        let (coordinator, primary, secondary, journal) = coordinator();
        primary.set_reject_writes(true);

        let err = coordinator.store("k", "v", None).await.unwrap_err();
        match err {
            Error::Backend {
                backend,
                operation,
                applied,
                ..
            } => {
                assert_eq!(backend, "redis");
                assert_eq!(operation, Operation::Store);
                assert!(applied.is_empty());
            }
            other => panic!("Expected Backend error, got {:?}", other),
        }

        assert_eq!(journal.entries(), vec!["redis:set:k"]);
        assert_eq!(secondary.len(), 0);
    }

    #[tokio::test]
    async fn test_secondary_store_failure_is_reported_without_rollback() {
        let (coordinator, primary, secondary, _) = coordinator();
        secondary.set_unreachable(true);

        let err = coordinator.store("k", "v", None).await.unwrap_err();
        assert!(err.is_partial());
        match err {
            Error::Backend {
                backend,
                source,
                applied,
                ..
            } => {
                assert_eq!(backend, "memcached");
                assert!(matches!(source, BackendError::Connection(_)));
                assert_eq!(applied, vec!["redis"]);
            }
            other => panic!("Expected Backend error, got {:?}", other),
        }

        // Primary keeps the newer value
        assert_eq!(primary.value_of("k").as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_primary_remove_failure_skips_secondary() {
        let (coordinator, primary, secondary, _) = coordinator();
        primary.seed("k", "v");
        secondary.seed("k", "v");
        primary.set_unreachable(true);

        assert!(coordinator.remove("k").await.is_err());
        assert_eq!(secondary.value_of("k").as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_secondary_remove_failure_keeps_primary_delete() {
        let (coordinator, primary, secondary, _) = coordinator();
        primary.seed("k", "v");
        secondary.seed("k", "v");
        secondary.set_unreachable(true);

        match coordinator.remove("k").await {
            Err(Error::Backend {
                backend,
                operation,
                applied,
                ..
            }) => {
                assert_eq!(backend, "memcached");
                assert_eq!(operation, Operation::Remove);
                assert_eq!(applied, vec!["redis"]);
            }
            other => panic!("Expected Backend error, got {:?}", other),
        }

        // No rollback: the Primary delete stands, the Secondary still has the stale value
        assert_eq!(primary.value_of("k"), None);
        assert_eq!(secondary.value_of("k").as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_invalid_key_never_reaches_backends() {
        let (coordinator, _, _, journal) = coordinator();

        assert!(matches!(
            coordinator.store("", "v", None).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            coordinator.lookup("has space").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            coordinator.remove("").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(journal.entries().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_stores_on_different_keys() {
        let (coordinator, primary, secondary, journal) = coordinator();
        let coordinator = Arc::new(coordinator);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let coordinator = coordinator.clone();
                tokio::spawn(async move {
                    let key = format!("key:{}", i);
                    let value = format!("value:{}", i);
                    coordinator.store(&key, &value, None).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for i in 0..16 {
            let key = format!("key:{}", i);
            let expected = format!("value:{}", i);
            assert_eq!(primary.value_of(&key), Some(expected.clone()));
            assert_eq!(secondary.value_of(&key), Some(expected));
        }

        // Each Primary write is immediately followed by the matching Secondary write
        let entries = journal.entries();
        for pair in entries.chunks(2) {
            let key = pair[0].trim_start_matches("redis:set:");
            assert_eq!(pair[1], format!("memcached:set:{}", key));
        }
    }
}

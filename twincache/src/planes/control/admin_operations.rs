use crate::coordinator::{CacheCoordinator, Mutation};
use crate::domain::response::admin::{BackendHealth, ClearResponse, HealthResponse};
use crate::planes::control::operation::AdminOperations;
use async_trait::async_trait;
use futures::future::join_all;
use shared::Result;
use tracing::{info, warn};

#[async_trait]
impl AdminOperations for CacheCoordinator {
    async fn clear_all(&self) -> Result<ClearResponse> {
        info!("Clearing all backends: {:?}", self.backend_names());
        let applied = self.apply_in_order(Mutation::ClearAll).await?;
        Ok(ClearResponse::new(applied))
    }

    /// Ping every backend concurrently. Does not take the write lock.
    async fn health(&self) -> HealthResponse {
        let probes = self.backends().iter().map(|backend| async move {
            match self.guarded(backend.ping()).await {
                Ok(()) => BackendHealth {
                    name: backend.name().to_string(),
                    healthy: true,
                    error: None,
                },
                Err(e) => {
                    warn!("Health check failed for {}: {}", backend.name(), e);
                    BackendHealth {
                        name: backend.name().to_string(),
                        healthy: false,
                        error: Some(e.to_string()),
                    }
                }
            }
        });

        HealthResponse::new(join_all(probes).await)
    }
}

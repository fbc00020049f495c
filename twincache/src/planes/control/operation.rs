use crate::domain::response::admin::{ClearResponse, HealthResponse};
use async_trait::async_trait;
use shared::Result;

#[async_trait]
pub trait AdminOperations: Send + Sync + 'static {
    /// Empty every backend, in precedence order
    async fn clear_all(&self) -> Result<ClearResponse>;
    async fn health(&self) -> HealthResponse;
}

use std::sync::Arc;
use twincache::CacheCoordinator;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<CacheCoordinator>,
}

impl AppState {
    pub fn new(coordinator: Arc<CacheCoordinator>) -> Self {
        Self { coordinator }
    }
}

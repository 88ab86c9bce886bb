use std::sync::Arc;

use crate::db::{MemoryRecommendationStore, RecommendationStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecommendationStore>,
}

impl AppState {
    /// Creates state around an already constructed record store
    pub fn new(store: Arc<dyn RecommendationStore>) -> Self {
        Self { store }
    }

    /// Creates state backed by an empty in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryRecommendationStore::new()))
    }
}

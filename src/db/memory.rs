use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::RecommendationStore,
    error::{AppError, AppResult},
    models::Recommendation,
};

/// In-process record store
///
/// Holds rows in a `BTreeMap` keyed by id so scans come back in id order.
/// Ids start at 1 and are never reused, even after a delete.
#[derive(Clone, Default)]
pub struct MemoryRecommendationStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    rows: BTreeMap<i32, Recommendation>,
    last_id: i32,
}

impl MemoryRecommendationStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    async fn filter<F>(&self, predicate: F) -> Vec<Recommendation>
    where
        F: Fn(&Recommendation) -> bool,
    {
        let inner = self.inner.read().await;
        inner.rows.values().filter(|&r| predicate(r)).cloned().collect()
    }
}

#[async_trait::async_trait]
impl RecommendationStore for MemoryRecommendationStore {
    async fn create(&self, mut recommendation: Recommendation) -> AppResult<Recommendation> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = inner.last_id;
        recommendation.id = Some(id);
        inner.rows.insert(id, recommendation.clone());
        tracing::info!(id, product_a = %recommendation.product_a, "Created recommendation");
        Ok(recommendation)
    }

    async fn save(&self, recommendation: &Recommendation) -> AppResult<()> {
        let Some(id) = recommendation.id else {
            return Err(AppError::Internal(
                "cannot save a recommendation without an id".into(),
            ));
        };

        let mut inner = self.inner.write().await;
        if let Some(row) = inner.rows.get_mut(&id) {
            *row = recommendation.clone();
        }
        Ok(())
    }

    async fn delete(&self, recommendation: &Recommendation) -> AppResult<()> {
        if let Some(id) = recommendation.id {
            self.inner.write().await.rows.remove(&id);
        }
        Ok(())
    }

    async fn find(&self, id: i32) -> AppResult<Option<Recommendation>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn all(&self) -> AppResult<Vec<Recommendation>> {
        Ok(self.filter(|_| true).await)
    }

    async fn find_by_recom_type(&self, recom_type: &str) -> AppResult<Vec<Recommendation>> {
        Ok(self.filter(|r| r.recom_type == recom_type).await)
    }

    async fn find_by_product_a(&self, product_a: &str) -> AppResult<Vec<Recommendation>> {
        Ok(self.filter(|r| r.product_a == product_a).await)
    }

    async fn find_by_product_b(&self, product_b: &str) -> AppResult<Vec<Recommendation>> {
        Ok(self.filter(|r| r.product_b == product_b).await)
    }

    async fn find_by_recom_type_and_product_a(
        &self,
        recom_type: &str,
        product_a: &str,
    ) -> AppResult<Vec<Recommendation>> {
        Ok(self
            .filter(|r| r.recom_type == recom_type && r.product_a == product_a)
            .await)
    }

    async fn find_by_recom_type_and_product_b(
        &self,
        recom_type: &str,
        product_b: &str,
    ) -> AppResult<Vec<Recommendation>> {
        Ok(self
            .filter(|r| r.recom_type == recom_type && r.product_b == product_b)
            .await)
    }
}

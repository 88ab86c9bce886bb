use crate::{
    error::{AppError, AppResult},
    models::Recommendation,
};

/// Persistence operations over recommendation records
///
/// Implementations own the stored rows; every method hands back detached
/// copies. Sequences are returned in id order.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Inserts the record under a freshly assigned id, ignoring any id it carries.
    ///
    /// Returns the stored record with its id set.
    async fn create(&self, recommendation: Recommendation) -> AppResult<Recommendation>;

    /// Writes every field of an already stored record.
    ///
    /// Succeeds without effect when no row has the record's id.
    async fn save(&self, recommendation: &Recommendation) -> AppResult<()>;

    /// Removes the record. Deleting an absent record is not an error.
    async fn delete(&self, recommendation: &Recommendation) -> AppResult<()>;

    /// Point lookup by id
    async fn find(&self, id: i32) -> AppResult<Option<Recommendation>>;

    /// Point lookup that fails with [`AppError::NotFound`] when absent
    async fn find_or_fail(&self, id: i32) -> AppResult<Recommendation> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::recommendation_not_found(id))
    }

    /// Every stored record
    async fn all(&self) -> AppResult<Vec<Recommendation>>;

    async fn find_by_recom_type(&self, recom_type: &str) -> AppResult<Vec<Recommendation>>;

    async fn find_by_product_a(&self, product_a: &str) -> AppResult<Vec<Recommendation>>;

    async fn find_by_product_b(&self, product_b: &str) -> AppResult<Vec<Recommendation>>;

    async fn find_by_recom_type_and_product_a(
        &self,
        recom_type: &str,
        product_a: &str,
    ) -> AppResult<Vec<Recommendation>>;

    async fn find_by_recom_type_and_product_b(
        &self,
        recom_type: &str,
        product_b: &str,
    ) -> AppResult<Vec<Recommendation>>;
}

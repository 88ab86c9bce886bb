use crate::{
    db::RecommendationStore,
    error::{AppError, AppResult},
    models::{parse_body, Recommendation},
};

/// Query parameters accepted when listing recommendations
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub recom_type: Option<String>,
    pub product_a: Option<String>,
    pub product_b: Option<String>,
}

impl ListQuery {
    /// Builds the query from decoded `key=value` pairs.
    ///
    /// A repeated key keeps its first value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "recom_type" => &mut query.recom_type,
                "product_a" => &mut query.product_a,
                "product_b" => &mut query.product_b,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

/// Lists recommendations, filtered by the first query parameter present
///
/// Priority is `recom_type`, then `product_a`, then `product_b`; empty values
/// count as absent. With no filter every record is returned.
pub async fn list_recommendations(
    store: &dyn RecommendationStore,
    query: &ListQuery,
) -> AppResult<Vec<Recommendation>> {
    let present = |value: &Option<String>| value.as_deref().filter(|v| !v.is_empty()).map(str::to_owned);

    if let Some(recom_type) = present(&query.recom_type) {
        tracing::info!(recom_type = %recom_type, "Find by recommendation type");
        store.find_by_recom_type(&recom_type).await
    } else if let Some(product_a) = present(&query.product_a) {
        tracing::info!(product_a = %product_a, "Find by product A");
        store.find_by_product_a(&product_a).await
    } else if let Some(product_b) = present(&query.product_b) {
        tracing::info!(product_b = %product_b, "Find by product B");
        store.find_by_product_b(&product_b).await
    } else {
        tracing::info!("Find all");
        store.all().await
    }
}

/// Replaces the fields of an existing recommendation with those in `body`
///
/// The id is looked up before the body is read, so an unknown id is reported
/// as not found even when the body is malformed.
pub async fn update_recommendation(
    store: &dyn RecommendationStore,
    id: i32,
    body: &[u8],
) -> AppResult<Recommendation> {
    let mut recommendation = store.find_or_fail(id).await?;
    recommendation.deserialize(&parse_body(body)?)?;
    recommendation.id = Some(id);
    store.save(&recommendation).await?;
    Ok(recommendation)
}

/// Adds one like to a recommendation and returns the new count
///
/// This is a read-modify-write with no locking; concurrent likes on the same
/// id can lose updates.
pub async fn like_recommendation(store: &dyn RecommendationStore, id: i32) -> AppResult<i32> {
    let mut recommendation = store.find_or_fail(id).await?;
    recommendation.likes = recommendation
        .likes
        .checked_add(1)
        .ok_or_else(|| AppError::Internal(format!("likes counter overflow for id {}", id)))?;
    store.save(&recommendation).await?;

    tracing::info!(id, likes = recommendation.likes, "Recommendation liked");
    Ok(recommendation.likes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryRecommendationStore, MockRecommendationStore};
    use crate::models::DataValidationError;
    use mockall::predicate::eq;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn stored(id: i32, a: &str, b: &str, t: &str) -> Recommendation {
        let mut recommendation = Recommendation::new(a, b, t);
        recommendation.id = Some(id);
        recommendation
    }

    fn query(recom_type: Option<&str>, product_a: Option<&str>, product_b: Option<&str>) -> ListQuery {
        ListQuery {
            recom_type: recom_type.map(String::from),
            product_a: product_a.map(String::from),
            product_b: product_b.map(String::from),
        }
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_list_query_from_pairs_keeps_first_value() {
        let query = ListQuery::from_pairs(pairs(&[
            ("recom_type", "A"),
            ("likes", "3"),
            ("recom_type", "B"),
            ("product_b", "socks"),
        ]));

        assert_eq!(
            query,
            ListQuery {
                recom_type: Some("A".to_string()),
                product_a: None,
                product_b: Some("socks".to_string()),
            }
        );
        assert_eq!(ListQuery::from_pairs(Vec::new()), ListQuery::default());
    }

    #[tokio::test]
    async fn test_list_prefers_recom_type() {
        let mut store = MockRecommendationStore::new();
        store
            .expect_find_by_recom_type()
            .with(eq("A"))
            .times(1)
            .returning(|_| Ok(vec![stored(1, "gloves", "socks", "A")]));

        let result = list_recommendations(&store, &query(Some("A"), Some("gloves"), Some("socks"))).await;
        assert_eq!(assert_ok!(result).len(), 1);
    }

    #[tokio::test]
    async fn test_list_falls_back_to_product_a_then_b() {
        let mut store = MockRecommendationStore::new();
        store
            .expect_find_by_product_a()
            .with(eq("gloves"))
            .times(1)
            .returning(|_| Ok(vec![]));
        store
            .expect_find_by_product_b()
            .with(eq("socks"))
            .times(1)
            .returning(|_| Ok(vec![]));

        assert_ok!(list_recommendations(&store, &query(None, Some("gloves"), Some("socks"))).await);
        assert_ok!(list_recommendations(&store, &query(Some(""), None, Some("socks"))).await);
    }

    #[tokio::test]
    async fn test_list_without_filter_returns_all() {
        let mut store = MockRecommendationStore::new();
        store.expect_all().times(1).returning(|| {
            Ok(vec![
                stored(1, "gloves", "socks", "A"),
                stored(2, "hats", "pants", "B"),
            ])
        });

        let result = list_recommendations(&store, &ListQuery::default()).await;
        assert_eq!(assert_ok!(result).len(), 2);
    }

    #[tokio::test]
    async fn test_list_propagates_store_errors() {
        let mut store = MockRecommendationStore::new();
        store
            .expect_all()
            .returning(|| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let err = assert_err!(list_recommendations(&store, &ListQuery::default()).await);
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_update_forces_path_id() {
        let store = MemoryRecommendationStore::new();
        let created = store
            .create(Recommendation::new("gloves", "socks", "A"))
            .await
            .unwrap();
        let id = created.id.unwrap();

        let body = json!({"id": 500, "product_a": "hats", "product_b": "socks", "recom_type": "B"});
        let updated = assert_ok!(update_recommendation(&store, id, body.to_string().as_bytes()).await);

        assert_eq!(updated.id, Some(id));
        assert_eq!(updated.product_a, "hats");
        assert_eq!(store.find_or_fail(id).await.unwrap(), updated);
        assert_eq!(store.find(500).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryRecommendationStore::new();
        let body = json!({"product_a": "hats", "product_b": "socks", "recom_type": "B"});
        let err = assert_err!(update_recommendation(&store, 3, body.to_string().as_bytes()).await);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_missing_with_malformed_body_is_not_found() {
        let mut store = MockRecommendationStore::new();
        store
            .expect_find_or_fail()
            .with(eq(4242))
            .times(1)
            .returning(|id| Err(AppError::recommendation_not_found(id)));
        store.expect_save().never();

        let err = assert_err!(update_recommendation(&store, 4242, b"not json").await);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_malformed_body_is_bad_request() {
        let store = MemoryRecommendationStore::new();
        let created = store
            .create(Recommendation::new("gloves", "socks", "A"))
            .await
            .unwrap();

        let err = assert_err!(update_recommendation(&store, created.id.unwrap(), b"not json").await);
        assert!(matches!(err, AppError::Validation(DataValidationError::NotAnObject)));
    }

    #[tokio::test]
    async fn test_update_invalid_body_is_not_saved() {
        let mut store = MockRecommendationStore::new();
        store
            .expect_find_or_fail()
            .with(eq(1))
            .returning(|id| Ok(stored(id, "gloves", "socks", "A")));
        store.expect_save().never();

        let body = json!({"product_a": "hats"}).to_string();
        let err = assert_err!(update_recommendation(&store, 1, body.as_bytes()).await);
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_like_increments_by_one() {
        let store = MemoryRecommendationStore::new();
        let created = store
            .create(Recommendation::new("gloves", "socks", "A"))
            .await
            .unwrap();
        let id = created.id.unwrap();

        for expected in 1..=3 {
            assert_eq!(assert_ok!(like_recommendation(&store, id).await), expected);
        }
        assert_eq!(store.find_or_fail(id).await.unwrap().likes, 3);
    }

    #[tokio::test]
    async fn test_like_missing_is_not_found() {
        let store = MemoryRecommendationStore::new();
        let err = assert_err!(like_recommendation(&store, 8).await);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_like_overflow_is_rejected() {
        let mut store = MockRecommendationStore::new();
        store.expect_find_or_fail().returning(|id| {
            let mut recommendation = stored(id, "gloves", "socks", "A");
            recommendation.likes = i32::MAX;
            Ok(recommendation)
        });
        store.expect_save().never();

        let err = assert_err!(like_recommendation(&store, 1).await);
        assert!(matches!(err, AppError::Internal(_)));
    }
}

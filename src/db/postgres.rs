use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::RecommendationStore,
    error::{AppError, AppResult},
    models::Recommendation,
};

/// Migrations embedded from `./migrations`, applied at startup
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Creates the recommendations table if it does not exist yet
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    tracing::info!("Initializing database");
    MIGRATOR.run(pool).await?;
    Ok(())
}

const SELECT_COLUMNS: &str = "SELECT id, product_a, product_b, recom_type, likes FROM recommendations";

/// Record store backed by the `recommendations` table
#[derive(Clone)]
pub struct PgRecommendationStore {
    pool: PgPool,
}

impl PgRecommendationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, clause: &str, binds: &[&str]) -> AppResult<Vec<Recommendation>> {
        let sql = format!("{SELECT_COLUMNS} WHERE {clause} ORDER BY id");
        let mut query = sqlx::query_as::<_, Recommendation>(&sql);
        for value in binds {
            query = query.bind(*value);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }
}

#[async_trait::async_trait]
impl RecommendationStore for PgRecommendationStore {
    #[tracing::instrument(skip(self, recommendation), fields(product_a = %recommendation.product_a))]
    async fn create(&self, recommendation: Recommendation) -> AppResult<Recommendation> {
        tracing::info!("Creating recommendation");
        let created = sqlx::query_as::<_, Recommendation>(
            r#"
            INSERT INTO recommendations (product_a, product_b, recom_type, likes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, product_a, product_b, recom_type, likes
            "#,
        )
        .bind(&recommendation.product_a)
        .bind(&recommendation.product_b)
        .bind(&recommendation.recom_type)
        .bind(recommendation.likes)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self, recommendation), fields(id = ?recommendation.id))]
    async fn save(&self, recommendation: &Recommendation) -> AppResult<()> {
        tracing::info!(product_a = %recommendation.product_a, "Saving recommendation");
        let id = recommendation
            .id
            .ok_or_else(|| AppError::Internal("cannot save a recommendation without an id".into()))?;

        let result = sqlx::query(
            r#"
            UPDATE recommendations
            SET product_a = $2, product_b = $3, recom_type = $4, likes = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&recommendation.product_a)
        .bind(&recommendation.product_b)
        .bind(&recommendation.recom_type)
        .bind(recommendation.likes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!("No row to update");
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, recommendation), fields(id = ?recommendation.id))]
    async fn delete(&self, recommendation: &Recommendation) -> AppResult<()> {
        tracing::info!(product_a = %recommendation.product_a, "Deleting recommendation");
        let Some(id) = recommendation.id else {
            return Ok(());
        };

        sqlx::query("DELETE FROM recommendations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find(&self, id: i32) -> AppResult<Option<Recommendation>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
        let recommendation = sqlx::query_as::<_, Recommendation>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(recommendation)
    }

    #[tracing::instrument(skip(self))]
    async fn all(&self) -> AppResult<Vec<Recommendation>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY id");
        let recommendations = sqlx::query_as::<_, Recommendation>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(recommendations)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_recom_type(&self, recom_type: &str) -> AppResult<Vec<Recommendation>> {
        self.fetch_where("recom_type = $1", &[recom_type]).await
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_product_a(&self, product_a: &str) -> AppResult<Vec<Recommendation>> {
        self.fetch_where("product_a = $1", &[product_a]).await
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_product_b(&self, product_b: &str) -> AppResult<Vec<Recommendation>> {
        self.fetch_where("product_b = $1", &[product_b]).await
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_recom_type_and_product_a(
        &self,
        recom_type: &str,
        product_a: &str,
    ) -> AppResult<Vec<Recommendation>> {
        self.fetch_where("recom_type = $1 AND product_a = $2", &[recom_type, product_a])
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_recom_type_and_product_b(
        &self,
        recom_type: &str,
        product_b: &str,
    ) -> AppResult<Vec<Recommendation>> {
        self.fetch_where("recom_type = $1 AND product_b = $2", &[recom_type, product_b])
            .await
    }
}

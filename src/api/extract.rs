use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap},
};

use crate::error::{AppError, AppResult};

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Recommendation id taken from the request path
///
/// A segment that is not an integer cannot name a recommendation, so it is
/// rejected as not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for RecommendationId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::NotFound(rejection.body_text()))?;

        raw.parse::<i32>().map(RecommendationId).map_err(|_| {
            AppError::NotFound(format!("Recommendation with id '{}' was not found.", raw))
        })
    }
}

/// Checks that the request body is declared as JSON
///
/// Media type parameters such as `charset` are ignored.
pub fn require_json(headers: &HeaderMap) -> AppResult<()> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let media_type = content_type.split(';').next().unwrap_or_default().trim();

    if media_type.eq_ignore_ascii_case(JSON_MEDIA_TYPE) {
        return Ok(());
    }

    tracing::error!(content_type = %content_type, "Invalid Content-Type");
    Err(AppError::UnsupportedMediaType(format!(
        "Content-Type must be {}",
        JSON_MEDIA_TYPE
    )))
}

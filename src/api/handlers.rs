use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{
        header::{HOST, LOCATION},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{parse_body, Recommendation},
    services::recommendations::{self, ListQuery},
};

use super::extract::{require_json, RecommendationId};
use super::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// URL of a single recommendation, used for the `Location` header
///
/// Absolute when the request named its host, a bare path otherwise.
pub fn recommendation_url(host: Option<&str>, id: i32) -> String {
    match host.map(str::trim).filter(|h| !h.is_empty()) {
        Some(host) => format!("http://{}/recommendations/{}", host, id),
        None => format!("/recommendations/{}", id),
    }
}

/// Landing page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Create a recommendation from the posted body
pub async fn create_recommendation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    tracing::info!(request_id = %request_id, "Request to create a recommendation");
    require_json(&headers)?;

    let recommendation = Recommendation::from_json(&parse_body(&body)?)?;
    let created = state.store.create(recommendation).await?;
    let id = created
        .id
        .ok_or_else(|| AppError::Internal("store returned a recommendation without an id".into()))?;

    tracing::info!(request_id = %request_id, id, "Recommendation created");
    let host = headers.get(HOST).and_then(|value| value.to_str().ok());
    Ok((
        StatusCode::CREATED,
        [(LOCATION, recommendation_url(host, id))],
        Json(created.to_json()),
    ))
}

/// List recommendations, optionally filtered by query parameters
pub async fn list_recommendations(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Json<Vec<Value>>> {
    tracing::info!("Request for recommendation list");
    let query = ListQuery::from_pairs(pairs);
    let recommendations = recommendations::list_recommendations(state.store.as_ref(), &query).await?;
    Ok(Json(recommendations.iter().map(Recommendation::to_json).collect()))
}

/// Retrieve a single recommendation
pub async fn get_recommendation(
    State(state): State<AppState>,
    RecommendationId(id): RecommendationId,
) -> AppResult<Json<Value>> {
    tracing::info!(id, "Request for recommendation");
    let recommendation = state
        .store
        .find(id)
        .await?
        .ok_or_else(|| AppError::recommendation_not_found(id))?;
    Ok(Json(recommendation.to_json()))
}

/// Replace the fields of an existing recommendation
pub async fn update_recommendation(
    State(state): State<AppState>,
    RecommendationId(id): RecommendationId,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    tracing::info!(id, "Request to update recommendation");
    require_json(&headers)?;

    let recommendation =
        recommendations::update_recommendation(state.store.as_ref(), id, &body).await?;
    Ok(Json(recommendation.to_json()))
}

/// Delete a recommendation; absent ids succeed as well
pub async fn delete_recommendation(
    State(state): State<AppState>,
    RecommendationId(id): RecommendationId,
) -> AppResult<StatusCode> {
    tracing::info!(id, "Request to delete recommendation");
    if let Some(recommendation) = state.store.find(id).await? {
        state.store.delete(&recommendation).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Add one like to a recommendation
pub async fn like_recommendation(
    State(state): State<AppState>,
    RecommendationId(id): RecommendationId,
) -> AppResult<Json<Value>> {
    tracing::info!(id, "Request to like recommendation");
    let likes = recommendations::like_recommendation(state.store.as_ref(), id).await?;
    Ok(Json(json!({ "likes": likes })))
}

/// Fallback for paths no route matches
pub async fn not_found() -> AppError {
    AppError::NotFound("The requested URL was not found on the server.".to_string())
}

use axum::{
    http::{
        header::{ALLOW, CONTENT_TYPE},
        StatusCode,
    },
    middleware::{from_fn, map_response},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route(
            "/recommendations",
            get(handlers::list_recommendations).post(handlers::create_recommendation),
        )
        .route(
            "/recommendations/:id",
            get(handlers::get_recommendation)
                .put(handlers::update_recommendation)
                .delete(handlers::delete_recommendation),
        )
        .route("/recommendations/:id/like", put(handlers::like_recommendation))
        .fallback(handlers::not_found)
        .layer(map_response(method_not_allowed_envelope))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Gives the router's bare 405 responses the JSON error envelope
async fn method_not_allowed_envelope(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED
        || response.headers().contains_key(CONTENT_TYPE)
    {
        return response;
    }

    let allow = response.headers().get(ALLOW).cloned();
    let mut envelope =
        AppError::MethodNotAllowed("The method is not allowed for the requested URL.".to_string())
            .into_response();
    if let Some(allow) = allow {
        envelope.headers_mut().insert(ALLOW, allow);
    }
    envelope
}

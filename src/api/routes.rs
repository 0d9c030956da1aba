use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.allowed_origins);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Curated lists
        .route("/movies/trending", get(handlers::trending_movies))
        .route("/movies/popular", get(handlers::popular_movies))
        .route("/movies/top-rated", get(handlers::top_rated_movies))
        // Movie lookups
        .route("/movies/:tmdb_id", get(handlers::movie_details))
        .route("/movies/:tmdb_id/credits", get(handlers::movie_credits))
        // Search & recommendations
        .route("/search/autocomplete", get(handlers::autocomplete))
        .route("/recommend", get(handlers::recommend))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(cors)
}

/// CORS for the configured origins, or any origin when none are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

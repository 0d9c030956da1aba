use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{CreditsResponse, MovieDetails, MovieList, RecommendationResponse},
};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub title: String,
    pub k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub query: String,
}

// Handlers

/// Root liveness probe
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn trending_movies(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.movies.list(MovieList::Trending).await)
}

pub async fn popular_movies(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.movies.list(MovieList::Popular).await)
}

pub async fn top_rated_movies(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.movies.list(MovieList::TopRated).await)
}

/// Local title autocomplete
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteQuery>,
) -> AppResult<Json<Vec<String>>> {
    let titles = state.movies.autocomplete(&params.query)?;
    Ok(Json(titles))
}

/// Recommendations for a title: local index first, provider fallback second
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let k = params.k.unwrap_or(state.settings.default_k);
    if k == 0 || k > state.settings.max_k {
        return Err(AppError::InvalidInput(format!(
            "k must be between 1 and {}",
            state.settings.max_k
        )));
    }

    tracing::info!(
        request_id = %request_id,
        title = %params.title,
        k,
        "Processing recommendation request"
    );

    let response = tokio::time::timeout(
        state.settings.request_timeout,
        state.recommender.recommend(&params.title, k),
    )
    .await
    .map_err(|_| {
        AppError::Timeout(format!(
            "Recommendations for '{}' took longer than {:?}",
            params.title, state.settings.request_timeout
        ))
    })??;

    Ok(Json(response))
}

pub async fn movie_details(
    State(state): State<AppState>,
    Path(tmdb_id): Path<u64>,
) -> AppResult<Json<MovieDetails>> {
    let details = state.movies.details(tmdb_id).await?;
    Ok(Json(details))
}

pub async fn movie_credits(
    State(state): State<AppState>,
    Path(tmdb_id): Path<u64>,
) -> AppResult<Json<CreditsResponse>> {
    let credits = state.movies.credits(tmdb_id).await?;
    Ok(Json(credits))
}

use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    cached,
    db::{CacheKey, Clock, MetadataStore, ResponseCache},
    error::{AppError, AppResult},
    models::{CreditsResponse, CreditsSource, MovieDetails, MovieList, IMAGE_BASE},
    services::providers::MovieProvider,
};

/// Maximum titles returned by autocomplete
const AUTOCOMPLETE_LIMIT: usize = 7;
const AUTOCOMPLETE_MIN_LEN: usize = 2;

const CAST_LIMIT: usize = 6;
const DETAIL_CREW_LIMIT: usize = 3;
const LOCAL_CREW_LIMIT: usize = 4;

/// Crew jobs surfaced for locally stored credits
const LOCAL_CREW_JOBS: [&str; 5] = [
    "Director",
    "Writer",
    "Screenplay",
    "Producer",
    "Executive Producer",
];

/// Crew jobs surfaced for provider credits
const REMOTE_CREW_JOBS: [&str; 3] = ["Director", "Producer", "Writer"];

/// Browse, lookup and autocomplete over local metadata with provider fallback
pub struct MovieService {
    provider: Arc<dyn MovieProvider>,
    metadata: Arc<MetadataStore>,
    cache: Arc<ResponseCache<Vec<Value>>>,
    clock: Arc<dyn Clock>,
}

impl MovieService {
    pub fn new(
        provider: Arc<dyn MovieProvider>,
        metadata: Arc<MetadataStore>,
        cache: Arc<ResponseCache<Vec<Value>>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            metadata,
            cache,
            clock,
        }
    }

    /// Curated list, served from cache while fresh
    ///
    /// A failed refresh falls back to the last cached copy, or an empty list.
    pub async fn list(&self, list: MovieList) -> Vec<Value> {
        let provider = self.provider.clone();
        cached!(
            self.cache,
            CacheKey::MovieList(list),
            self.clock.now(),
            async move { provider.fetch_list(list).await }
        )
    }

    /// Local titles starting with `query`, best rated first
    pub fn autocomplete(&self, query: &str) -> AppResult<Vec<String>> {
        if query.chars().count() < AUTOCOMPLETE_MIN_LEN {
            return Err(AppError::InvalidInput(format!(
                "Query must be at least {} characters",
                AUTOCOMPLETE_MIN_LEN
            )));
        }
        Ok(self.metadata.autocomplete(query, AUTOCOMPLETE_LIMIT))
    }

    /// Movie details from the local table, falling back to the provider
    pub async fn details(&self, id: u64) -> AppResult<MovieDetails> {
        if let Some(record) = self.metadata.lookup_by_id(id) {
            return Ok(MovieDetails {
                id,
                title: record.title.clone(),
                overview: record.overview.clone(),
                rating: record.vote_average,
                release_date: record.release_date.clone(),
                runtime: record.runtime,
                genres: record.genre_list(),
                poster: record.poster_url(),
                cast: Some(record.cast_list().into_iter().take(CAST_LIMIT).collect()),
                crew: Some(
                    record
                        .crew_list()
                        .into_iter()
                        .take(DETAIL_CREW_LIMIT)
                        .collect(),
                ),
            });
        }

        let movie = self.provider.fetch_detail(id, false).await.map_err(|e| {
            tracing::warn!(id, error = %e, "Provider detail lookup failed");
            AppError::ExternalApi("Movie details unavailable".to_string())
        })?;

        Ok(MovieDetails {
            id: movie.id,
            title: movie.title,
            overview: movie.overview,
            rating: movie.vote_average,
            release_date: movie.release_date,
            runtime: movie.runtime,
            genres: movie.genres.into_iter().map(|g| json!(g.name)).collect(),
            poster: movie
                .poster_path
                .filter(|p| !p.is_empty())
                .map(|p| format!("{}{}", IMAGE_BASE, p)),
            cast: None,
            crew: None,
        })
    }

    /// Cast and key crew from the local table, falling back to the provider
    pub async fn credits(&self, id: u64) -> AppResult<CreditsResponse> {
        if let Some(record) = self.metadata.lookup_by_id(id) {
            let crew = record
                .crew_list()
                .into_iter()
                .filter(|c| {
                    c.get("job")
                        .and_then(Value::as_str)
                        .is_some_and(|job| LOCAL_CREW_JOBS.contains(&job))
                })
                .take(LOCAL_CREW_LIMIT)
                .collect();

            return Ok(CreditsResponse {
                cast: record.cast_list().into_iter().take(CAST_LIMIT).collect(),
                crew,
                source: CreditsSource::Cache,
            });
        }

        let credits = self.provider.fetch_credits(id).await.map_err(|e| {
            tracing::warn!(id, error = %e, "Provider credits lookup failed");
            AppError::ExternalApi("Credits unavailable".to_string())
        })?;

        Ok(CreditsResponse {
            cast: credits
                .cast
                .into_iter()
                .take(CAST_LIMIT)
                .map(|c| json!({"name": c.name, "character": c.character}))
                .collect(),
            crew: credits
                .crew
                .into_iter()
                .filter(|c| REMOTE_CREW_JOBS.contains(&c.job.as_str()))
                .map(|c| json!({"name": c.name, "job": c.job}))
                .collect(),
            source: CreditsSource::Tmdb,
        })
    }
}

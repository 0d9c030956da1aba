/// TMDB API provider
///
/// API Flow:
/// 1. Search: /search/movie?query= → first result is the best match
/// 2. Details: /movie/{id}?append_to_response=credits,keywords
/// 3. Lists: /trending/movie/week, /movie/popular, /movie/top_rated
use crate::{
    error::{AppError, AppResult},
    models::{
        MovieList, TmdbCredits, TmdbListResponse, TmdbMovieDetail, TmdbSearchResponse,
        TmdbSearchResult,
    },
    services::providers::MovieProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("nextwatch-api/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    /// Timeout for list, detail-page and credit lookups
    lookup_timeout: Duration,
}

impl TmdbProvider {
    /// Creates a provider whose client times out each request after `request_timeout`
    pub fn new(
        api_key: String,
        api_url: String,
        request_timeout: Duration,
        lookup_timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            lookup_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// GETs a TMDB path and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> AppResult<T> {
        let mut request = self
            .http_client
            .get(self.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("api_key", self.api_key.as_str())])
            .query(params);

        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

/// Picks the best match from a search response
fn first_match(response: TmdbSearchResponse) -> Option<TmdbSearchResult> {
    response.results.into_iter().next()
}

#[async_trait::async_trait]
impl MovieProvider for TmdbProvider {
    async fn search(&self, title: &str) -> AppResult<Option<TmdbSearchResult>> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let response: TmdbSearchResponse = self
            .get_json("/search/movie", &[("query", title)], None)
            .await?;

        tracing::debug!(
            query = %title,
            results = response.results.len(),
            provider = self.name(),
            "Title search completed"
        );

        Ok(first_match(response))
    }

    async fn fetch_detail(
        &self,
        id: u64,
        with_credits_and_keywords: bool,
    ) -> AppResult<TmdbMovieDetail> {
        let path = format!("/movie/{}", id);

        if with_credits_and_keywords {
            self.get_json(&path, &[("append_to_response", "credits,keywords")], None)
                .await
        } else {
            self.get_json(&path, &[], Some(self.lookup_timeout)).await
        }
    }

    async fn fetch_credits(&self, id: u64) -> AppResult<TmdbCredits> {
        self.get_json(
            &format!("/movie/{}/credits", id),
            &[],
            Some(self.lookup_timeout),
        )
        .await
    }

    async fn fetch_list(&self, list: MovieList) -> AppResult<Vec<Value>> {
        let response: TmdbListResponse = self
            .get_json(list.endpoint(), &[], Some(self.lookup_timeout))
            .await?;

        tracing::info!(
            endpoint = list.endpoint(),
            results = response.results.len(),
            provider = self.name(),
            "Movie list fetched"
        );

        Ok(response.results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

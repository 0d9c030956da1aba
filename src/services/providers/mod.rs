/// Remote movie metadata provider abstraction
///
/// The recommender only needs search and detail lookups; the list, detail and credit
/// endpoints of the service go through the same provider so a single API key and client
/// serve everything.
use serde_json::Value;

use crate::{
    error::AppResult,
    models::{MovieList, TmdbCredits, TmdbMovieDetail, TmdbSearchResult},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieProvider: Send + Sync {
    /// Best match for a title search, or `None` when the search returned nothing
    async fn search(&self, title: &str) -> AppResult<Option<TmdbSearchResult>>;

    /// Full movie record, with credits and keywords appended when requested
    async fn fetch_detail(
        &self,
        id: u64,
        with_credits_and_keywords: bool,
    ) -> AppResult<TmdbMovieDetail>;

    async fn fetch_credits(&self, id: u64) -> AppResult<TmdbCredits>;

    /// Raw entries of a curated list (trending, popular, top rated)
    async fn fetch_list(&self, list: MovieList) -> AppResult<Vec<Value>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

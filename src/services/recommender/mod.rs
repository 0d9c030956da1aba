//! Content-based movie recommendations
//!
//! A title found in the local corpus is answered straight from the document matrix. Any
//! other title is fetched from the movie provider, turned into a tag string, projected
//! into the matrix's feature space and matched the same way.

use std::sync::Arc;

use crate::{
    db::{Catalog, MetadataStore},
    error::{AppError, AppResult},
    models::{Recommendation, RecommendationResponse, RecommendationSource, TmdbMovieDetail},
    services::{
        providers::MovieProvider,
        retry::{RetryPolicy, Sleeper},
    },
};

pub mod enrich;
pub mod index;
pub mod projector;
pub mod tags;
pub mod text;

pub use enrich::MetadataEnricher;
pub use index::{cosine_similarity, DocumentMatrix, ExactIndex, TitleIndex, VectorIndex};
pub use projector::{FeatureProjector, Norm, ProjectorModel};
pub use tags::build_tags;
pub use text::normalize;

/// Order in which recommendation sources are tried; the first to produce a list wins
const STRATEGIES: [RecommendationSource; 2] =
    [RecommendationSource::Local, RecommendationSource::External];

/// Recommendation engine over the immutable catalog
///
/// Holds only shared read-only state, so one instance serves every request concurrently.
pub struct Recommender {
    catalog: Catalog,
    enricher: MetadataEnricher,
    provider: Arc<dyn MovieProvider>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Recommender {
    pub fn new(
        catalog: Catalog,
        metadata: Arc<MetadataStore>,
        provider: Arc<dyn MovieProvider>,
        retry: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let enricher = MetadataEnricher::new(catalog.corpus(), metadata);
        Self {
            catalog,
            enricher,
            provider,
            retry,
            sleeper,
        }
    }

    /// Recommends movies similar to a title in the local corpus
    ///
    /// Returns `None` when the title is not indexed, which sends the caller to the
    /// external path.
    pub fn recommend_known(&self, title: &str, k: usize) -> Option<Vec<Recommendation>> {
        let row = self.catalog.titles().lookup(title)?;
        let rows = self.catalog.index().top_k_from_row(row, k);

        tracing::debug!(title = %title, row, neighbors = rows.len(), "Known title lookup");

        Some(self.enricher.enrich(&rows))
    }

    /// Recommends movies similar to a title fetched from the movie provider
    ///
    /// Provider failures are absorbed: once every attempt has failed the result is empty.
    pub async fn recommend_external(&self, title: &str, k: usize) -> Vec<Recommendation> {
        let movie = match self.fetch_external_movie(title).await {
            Ok(movie) => movie,
            Err(e) => {
                tracing::warn!(
                    title = %title,
                    provider = self.provider.name(),
                    error = %e,
                    "Provider unavailable, returning no recommendations"
                );
                return Vec::new();
            }
        };

        let normalized = normalize(&build_tags(&movie));
        let query = self.catalog.projector().project(&normalized);
        let rows = self.catalog.index().top_k(&query, k, None);

        tracing::debug!(
            title = %title,
            matched_id = movie.id,
            neighbors = rows.len(),
            "External title projected"
        );

        self.enricher.enrich(&rows)
    }

    /// Tries the local index, then the provider
    pub async fn recommend(&self, title: &str, k: usize) -> AppResult<RecommendationResponse> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
        }

        for source in STRATEGIES {
            let found = match source {
                RecommendationSource::Local => self.recommend_known(title, k),
                RecommendationSource::External => Some(self.recommend_external(title, k).await),
            };

            if let Some(recommendations) = found {
                tracing::info!(
                    title = %title,
                    k,
                    source = ?source,
                    results = recommendations.len(),
                    "Recommendations generated"
                );
                return Ok(RecommendationResponse {
                    source,
                    recommendations,
                });
            }
        }

        Ok(RecommendationResponse {
            source: RecommendationSource::External,
            recommendations: Vec::new(),
        })
    }

    /// Searches the provider and fetches the best match with credits and keywords
    async fn fetch_external_movie(&self, title: &str) -> AppResult<TmdbMovieDetail> {
        let provider = self.provider.as_ref();

        self.retry
            .run(self.sleeper.as_ref(), |attempt| async move {
                let best = provider.search(title).await?.ok_or_else(|| {
                    AppError::ExternalApi(format!("No search results for '{}'", title))
                })?;

                tracing::debug!(title = %title, id = best.id, attempt, "Fetching provider detail");

                provider.fetch_detail(best.id, true).await
            })
            .await
    }
}

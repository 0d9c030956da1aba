use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nextwatch_api::{
    api::{create_router, ApiSettings, AppState},
    config::Config,
    db::{load_catalog, MetadataStore, ResponseCache, SystemClock},
    services::{MovieService, Recommender, RetryPolicy, TmdbProvider, TokioSleeper},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nextwatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Similarity artifacts are immutable for the life of the process; a width mismatch
    // between the vectorizer and the matrix is fatal here.
    let catalog = load_catalog(
        &config.corpus_path(),
        &config.vectors_path(),
        &config.vectorizer_path(),
    )
    .context("Failed to load similarity artifacts")?;

    let metadata = Arc::new(
        MetadataStore::load(&config.metadata_path()).context("Failed to load movie metadata")?,
    );
    tracing::info!(
        movies = catalog.len(),
        metadata = metadata.len(),
        "Catalog ready"
    );

    let provider = Arc::new(TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        Duration::from_secs(config.provider_timeout_secs),
        Duration::from_secs(config.list_timeout_secs),
    )?);

    let recommender = Recommender::new(
        catalog,
        metadata.clone(),
        provider.clone(),
        RetryPolicy::fixed(config.fetch_attempts, config.fetch_backoff()),
        Arc::new(TokioSleeper),
    );

    let ttl = chrono::Duration::from_std(config.cache_ttl())
        .context("Cache TTL out of range")?;
    let movies = MovieService::new(
        provider,
        metadata,
        Arc::new(ResponseCache::new(ttl)),
        Arc::new(SystemClock),
    );

    let state = AppState::new(recommender, movies, ApiSettings::from_config(&config));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

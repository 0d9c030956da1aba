use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::{MovieService, Recommender};

/// Request-level limits for the HTTP layer
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub default_k: usize,
    pub max_k: usize,
    /// Bound on a whole recommendation request, provider retries included
    pub request_timeout: Duration,
    /// CORS origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            default_k: 10,
            max_k: 50,
            request_timeout: Duration::from_secs(30),
            allowed_origins: Vec::new(),
        }
    }
}

impl ApiSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_k: config.max_k,
            request_timeout: config.request_timeout(),
            allowed_origins: config.origins(),
            ..Self::default()
        }
    }
}

/// Shared application state
///
/// Everything behind the `Arc`s is read-only except the list cache inside `MovieService`.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub movies: Arc<MovieService>,
    pub settings: ApiSettings,
}

impl AppState {
    pub fn new(recommender: Recommender, movies: MovieService, settings: ApiSettings) -> Self {
        Self {
            recommender: Arc::new(recommender),
            movies: Arc::new(movies),
            settings,
        }
    }
}

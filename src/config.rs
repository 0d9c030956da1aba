use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the corpus, metadata and vector artifacts
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_corpus_file")]
    pub corpus_file: String,

    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,

    #[serde(default = "default_vectors_file")]
    pub vectors_file: String,

    #[serde(default = "default_vectorizer_file")]
    pub vectorizer_file: String,

    /// Comma-separated list of CORS origins; empty allows any origin
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,

    /// TTL for cached list endpoints (trending, popular, top rated)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Per-attempt timeout for the recommendation fetch
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Timeout for list, detail and credit lookups
    #[serde(default = "default_list_timeout_secs")]
    pub list_timeout_secs: u64,

    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,

    #[serde(default = "default_fetch_backoff_ms")]
    pub fetch_backoff_ms: u64,

    /// Upper bound on a whole recommendation request, retries included
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Largest `k` accepted by the recommend endpoint
    #[serde(default = "default_max_k")]
    pub max_k: usize,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_corpus_file() -> String {
    "movies_final.csv".to_string()
}

fn default_metadata_file() -> String {
    "tmdb_combined_with_trending.csv".to_string()
}

fn default_vectors_file() -> String {
    "movie_vectors.bin".to_string()
}

fn default_vectorizer_file() -> String {
    "vectorizer.json".to_string()
}

fn default_allowed_origins() -> String {
    "http://localhost:5173,http://127.0.0.1:5173,https://nextwatch-umber.vercel.app".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    21600 // 6 hours
}

fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_list_timeout_secs() -> u64 {
    10
}

fn default_fetch_attempts() -> u32 {
    3
}

fn default_fetch_backoff_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_k() -> usize {
    50
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn corpus_path(&self) -> PathBuf {
        self.data_dir.join(&self.corpus_file)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(&self.metadata_file)
    }

    pub fn vectors_path(&self) -> PathBuf {
        self.data_dir.join(&self.vectors_file)
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.data_dir.join(&self.vectorizer_file)
    }

    /// Parsed CORS origins, blank entries dropped
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn fetch_backoff(&self) -> Duration {
        Duration::from_millis(self.fetch_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

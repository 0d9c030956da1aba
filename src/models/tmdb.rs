use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// TMDB API Types
// ============================================================================

/// Response from `/search/movie`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbSearchResult>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TmdbSearchResult {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Response from `/movie/{id}`, optionally with credits and keywords appended
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TmdbMovieDetail {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub keywords: Option<TmdbKeywords>,
    #[serde(default)]
    pub credits: Option<TmdbCredits>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbGenre {
    #[serde(default)]
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TmdbKeywords {
    #[serde(default)]
    pub keywords: Vec<TmdbKeyword>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbKeyword {
    #[serde(default)]
    pub id: u64,
    pub name: String,
}

/// Response from `/movie/{id}/credits`, also embedded in detail responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbCastMember {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

/// Paged list response (`/trending/movie/week`, `/movie/popular`, ...)
///
/// Entries are passed through untouched to the client.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbListResponse {
    #[serde(default)]
    pub results: Vec<Value>,
}

/// Curated movie lists served by the list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovieList {
    Trending,
    Popular,
    TopRated,
}

impl MovieList {
    /// TMDB endpoint path for this list
    pub fn endpoint(&self) -> &'static str {
        match self {
            MovieList::Trending => "/trending/movie/week",
            MovieList::Popular => "/movie/popular",
            MovieList::TopRated => "/movie/top_rated",
        }
    }
}

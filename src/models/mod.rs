use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod tmdb;

pub use tmdb::{
    MovieList, TmdbCastMember, TmdbCredits, TmdbCrewMember, TmdbGenre, TmdbKeyword,
    TmdbKeywords, TmdbListResponse, TmdbMovieDetail, TmdbSearchResponse, TmdbSearchResult,
};

/// Base URL for rendered poster images
pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

// ============================================================================
// Catalog Types
// ============================================================================

/// One row of the similarity corpus
///
/// The row's position in the corpus is its index into the document matrix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusEntry {
    pub movie_id: u64,
    pub title: String,
}

/// Row of the secondary metadata table
///
/// `genres`, `cast` and `crew` keep their stored JSON-encoded representation and are
/// decoded on read with [`decode_json_list`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataRecord {
    pub id: u64,
    pub title: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub runtime: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub genres: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cast: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub crew: Option<String>,
}

impl MetadataRecord {
    pub fn genre_list(&self) -> Vec<Value> {
        decode_json_list(self.genres.as_deref())
    }

    pub fn cast_list(&self) -> Vec<Value> {
        decode_json_list(self.cast.as_deref())
    }

    pub fn crew_list(&self) -> Vec<Value> {
        decode_json_list(self.crew.as_deref())
    }

    /// Full poster URL, if a poster path is stored
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", IMAGE_BASE, p))
    }
}

/// Decodes a JSON-encoded list column
///
/// Null, empty or malformed content decodes to an empty list so a single bad field never
/// fails the whole record.
pub fn decode_json_list(raw: Option<&str>) -> Vec<Value> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => Vec::new(),
        Err(e) => {
            tracing::debug!(error = %e, "Malformed metadata list, substituting empty list");
            Vec::new()
        }
    }
}

// ============================================================================
// Recommendation Types
// ============================================================================

/// A recommended movie, enriched with whatever metadata could be resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<Value>>,
}

impl Recommendation {
    /// Minimal record for a corpus row without secondary metadata
    pub fn minimal(entry: &CorpusEntry) -> Self {
        Self {
            id: entry.movie_id,
            title: entry.title.clone(),
            poster_path: None,
            vote_average: None,
            release_date: None,
            runtime: None,
            genres: None,
        }
    }
}

impl From<&MetadataRecord> for Recommendation {
    fn from(record: &MetadataRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            poster_path: record.poster_path.clone(),
            vote_average: record.vote_average,
            release_date: record.release_date.clone(),
            runtime: record.runtime,
            genres: Some(record.genre_list()),
        }
    }
}

/// Which strategy produced a recommendation list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    /// Title found in the local similarity index
    Local,
    /// Title fetched from the remote provider and projected on demand
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub source: RecommendationSource,
    pub recommendations: Vec<Recommendation>,
}

// ============================================================================
// Movie Detail Types
// ============================================================================

/// Detail view of a single movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    pub overview: Option<String>,
    pub rating: Option<f64>,
    pub release_date: Option<String>,
    pub runtime: Option<f64>,
    pub genres: Vec<Value>,
    pub poster: Option<String>,
    pub cast: Option<Vec<Value>>,
    pub crew: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CreditsSource {
    /// Served from the local metadata table
    Cache,
    Tmdb,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditsResponse {
    pub cast: Vec<Value>,
    pub crew: Vec<Value>,
    pub source: CreditsSource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> MetadataRecord {
        MetadataRecord {
            id: 27205,
            title: "Inception".to_string(),
            overview: Some("A thief who steals corporate secrets".to_string()),
            poster_path: Some("/inception.jpg".to_string()),
            vote_average: Some(8.4),
            release_date: Some("2010-07-15".to_string()),
            runtime: Some(148.0),
            genres: Some(r#"[{"id": 28, "name": "Action"}]"#.to_string()),
            cast: Some("not json".to_string()),
            crew: None,
        }
    }

    #[test]
    fn test_decode_json_list_valid() {
        let decoded = decode_json_list(Some(r#"["Action", "Drama"]"#));
        assert_eq!(decoded, vec![json!("Action"), json!("Drama")]);
    }

    #[test]
    fn test_decode_json_list_defaults_to_empty() {
        assert!(decode_json_list(None).is_empty());
        assert!(decode_json_list(Some("")).is_empty());
        assert!(decode_json_list(Some("null")).is_empty());
        assert!(decode_json_list(Some("{not json")).is_empty());
        assert!(decode_json_list(Some(r#"{"name": "Action"}"#)).is_empty());
    }

    #[test]
    fn test_malformed_field_does_not_affect_others() {
        let record = record();
        assert_eq!(record.genre_list(), vec![json!({"id": 28, "name": "Action"})]);
        assert!(record.cast_list().is_empty());
        assert!(record.crew_list().is_empty());
    }

    #[test]
    fn test_poster_url() {
        let mut record = record();
        assert_eq!(
            record.poster_url(),
            Some("https://image.tmdb.org/t/p/w500/inception.jpg".to_string())
        );
        record.poster_path = None;
        assert_eq!(record.poster_url(), None);
    }

    #[test]
    fn test_recommendation_from_record() {
        let rec = Recommendation::from(&record());
        assert_eq!(rec.id, 27205);
        assert_eq!(rec.poster_path, Some("/inception.jpg".to_string()));
        assert_eq!(rec.runtime, Some(148.0));
        assert_eq!(rec.genres, Some(vec![json!({"id": 28, "name": "Action"})]));
    }

    #[test]
    fn test_minimal_recommendation_serialization() {
        let entry = CorpusEntry {
            movie_id: 42,
            title: "Obscure Film".to_string(),
        };
        let json = serde_json::to_value(Recommendation::minimal(&entry)).unwrap();
        assert_eq!(
            json,
            json!({"id": 42, "title": "Obscure Film", "poster_path": null})
        );
    }

    #[test]
    fn test_source_serialization() {
        assert_eq!(
            serde_json::to_string(&RecommendationSource::Local).unwrap(),
            "\"local\""
        );
        assert_eq!(
            serde_json::to_string(&RecommendationSource::External).unwrap(),
            "\"external\""
        );
        assert_eq!(serde_json::to_string(&CreditsSource::Cache).unwrap(), "\"cache\"");
    }
}

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::MetadataRecord,
};

/// Secondary movie metadata table, keyed by id and by lowercase title
///
/// Read-only after load. When several rows share a key, the first row wins.
#[derive(Debug, Default)]
pub struct MetadataStore {
    records: Vec<MetadataRecord>,
    by_id: HashMap<u64, usize>,
    by_title: HashMap<String, usize>,
}

impl MetadataStore {
    pub fn from_records(records: Vec<MetadataRecord>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_title = HashMap::new();

        for (i, record) in records.iter().enumerate() {
            by_id.entry(record.id).or_insert(i);
            by_title.entry(record.title.to_lowercase()).or_insert(i);
        }

        Self {
            records,
            by_id,
            by_title,
        }
    }

    /// Loads the metadata CSV
    ///
    /// Rows that fail to parse are skipped with a warning so one bad row doesn't abort startup.
    pub fn load(path: &Path) -> AppResult<Self> {
        let bytes = fs::read(path).map_err(|e| {
            AppError::Artifact(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for row in reader.deserialize::<MetadataRecord>() {
            match row {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(error = %e, "Skipping malformed metadata row");
                }
            }
        }

        tracing::info!(
            records = records.len(),
            skipped,
            path = %path.display(),
            "Loaded movie metadata"
        );

        Ok(Self::from_records(records))
    }

    pub fn lookup_by_title(&self, title: &str) -> Option<&MetadataRecord> {
        self.by_title
            .get(&title.to_lowercase())
            .map(|&i| &self.records[i])
    }

    pub fn lookup_by_id(&self, id: u64) -> Option<&MetadataRecord> {
        self.by_id.get(&id).map(|&i| &self.records[i])
    }

    /// Titles starting with `prefix` (case-insensitive), best rated first
    pub fn autocomplete(&self, prefix: &str, limit: usize) -> Vec<String> {
        let prefix = prefix.to_lowercase();

        let mut matches: Vec<&MetadataRecord> = self
            .records
            .iter()
            .filter(|r| r.title.to_lowercase().starts_with(&prefix))
            .collect();

        matches.sort_by(|a, b| match (a.vote_average, b.vote_average) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        matches
            .into_iter()
            .take(limit)
            .map(|r| r.title.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(id: u64, title: &str, rating: Option<f64>) -> MetadataRecord {
        MetadataRecord {
            id,
            title: title.to_string(),
            overview: None,
            poster_path: None,
            vote_average: rating,
            release_date: None,
            runtime: None,
            genres: None,
            cast: None,
            crew: None,
        }
    }

    fn store() -> MetadataStore {
        MetadataStore::from_records(vec![
            record(1, "The Matrix", Some(8.2)),
            record(2, "The Matrix Reloaded", Some(7.0)),
            record(3, "The Mask", None),
            record(4, "The Matrix Resurrections", Some(6.4)),
            record(5, "Memento", Some(8.2)),
            record(6, "THE MATRIX", Some(1.0)),
        ])
    }

    #[test]
    fn test_lookup_by_title_case_insensitive() {
        let store = store();
        assert_eq!(store.lookup_by_title("the matrix").unwrap().id, 1);
        assert_eq!(store.lookup_by_title("MEMENTO").unwrap().id, 5);
        assert!(store.lookup_by_title("Heat").is_none());
    }

    #[test]
    fn test_lookup_by_id() {
        let store = store();
        assert_eq!(store.lookup_by_id(3).unwrap().title, "The Mask");
        assert!(store.lookup_by_id(99).is_none());
    }

    #[test]
    fn test_autocomplete_orders_by_rating() {
        let store = store();
        assert_eq!(
            store.autocomplete("the ma", 7),
            vec![
                "The Matrix",
                "The Matrix Reloaded",
                "The Matrix Resurrections",
                "THE MATRIX",
                "The Mask"
            ]
        );
    }

    #[test]
    fn test_autocomplete_limit() {
        let store = store();
        assert_eq!(store.autocomplete("THE MATRIX", 2).len(), 2);
        assert!(store.autocomplete("zz", 7).is_empty());
    }

    #[test]
    fn test_load_csv_with_missing_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tmdb.csv");
        fs::write(
            &path,
            "id,title,overview,poster_path,vote_average,release_date,\
             runtime,genres,cast,crew,popularity\n\
             27205,Inception,Dreams.,/inc.jpg,8.4,2010-07-15,\
             148.0,\"[\"\"Action\"\"]\",[],[],99.1\n\
             603,The Matrix,,,,,,,,,\n\
             not-an-id,Broken,,,,,,,,,\n",
        )
        .unwrap();

        let store = MetadataStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);

        let inception = store.lookup_by_id(27205).unwrap();
        assert_eq!(inception.runtime, Some(148.0));
        assert_eq!(inception.genre_list(), vec![serde_json::json!("Action")]);

        let matrix = store.lookup_by_title("the matrix").unwrap();
        assert_eq!(matrix.poster_path, None);
        assert_eq!(matrix.vote_average, None);
    }
}

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::CorpusEntry,
    services::recommender::{
        DocumentMatrix, ExactIndex, FeatureProjector, ProjectorModel, TitleIndex, VectorIndex,
    },
};

/// Immutable similarity catalog: corpus, title index, vector index and projector
///
/// Built once at startup. Construction enforces that every corpus row has a matrix row
/// and that the projector produces vectors of the matrix's width.
#[derive(Clone)]
pub struct Catalog {
    corpus: Arc<[CorpusEntry]>,
    titles: Arc<TitleIndex>,
    index: Arc<dyn VectorIndex>,
    projector: Arc<FeatureProjector>,
}

impl Catalog {
    /// Builds a catalog backed by an exhaustive cosine scan
    pub fn new(
        corpus: Vec<CorpusEntry>,
        matrix: DocumentMatrix,
        model: ProjectorModel,
    ) -> AppResult<Self> {
        let projector = FeatureProjector::new(model)?;
        Self::with_index(corpus, Arc::new(ExactIndex::new(matrix)), projector)
    }

    /// Builds a catalog over any vector index implementation
    pub fn with_index(
        corpus: Vec<CorpusEntry>,
        index: Arc<dyn VectorIndex>,
        projector: FeatureProjector,
    ) -> AppResult<Self> {
        if corpus.len() != index.len() {
            return Err(AppError::Artifact(format!(
                "Corpus has {} rows but the document matrix has {}",
                corpus.len(),
                index.len()
            )));
        }

        if projector.dimensions() != index.dimensions() {
            return Err(AppError::DimensionMismatch {
                expected: index.dimensions(),
                actual: projector.dimensions(),
            });
        }

        let titles = TitleIndex::build(&corpus);

        Ok(Self {
            corpus: corpus.into(),
            titles: Arc::new(titles),
            index,
            projector: Arc::new(projector),
        })
    }

    pub fn corpus(&self) -> Arc<[CorpusEntry]> {
        self.corpus.clone()
    }

    pub fn titles(&self) -> &TitleIndex {
        &self.titles
    }

    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    pub fn projector(&self) -> &FeatureProjector {
        &self.projector
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }
}

fn read_artifact(path: &Path) -> AppResult<Vec<u8>> {
    fs::read(path)
        .map_err(|e| AppError::Artifact(format!("Failed to read {}: {}", path.display(), e)))
}

/// Reads the corpus CSV (`movie_id`, `title`, extra columns ignored) in row order
pub fn load_corpus(path: &Path) -> AppResult<Vec<CorpusEntry>> {
    let bytes = read_artifact(path)?;
    let mut reader = csv::Reader::from_reader(bytes.as_slice());

    let corpus = reader
        .deserialize()
        .collect::<Result<Vec<CorpusEntry>, csv::Error>>()?;

    Ok(corpus)
}

/// Reads a bincode-encoded document matrix
pub fn load_matrix(path: &Path) -> AppResult<DocumentMatrix> {
    let bytes = read_artifact(path)?;
    let matrix: DocumentMatrix = bincode::deserialize(&bytes)?;
    matrix.validate()
}

/// Writes a document matrix in the format `load_matrix` reads
pub fn save_matrix(path: &Path, matrix: &DocumentMatrix) -> AppResult<()> {
    let bytes = bincode::serialize(matrix)?;
    let mut f = File::create(path)
        .map_err(|e| AppError::Artifact(format!("Failed to create {}: {}", path.display(), e)))?;
    f.write_all(&bytes)
        .map_err(|e| AppError::Artifact(format!("Failed to write {}: {}", path.display(), e)))?;
    Ok(())
}

/// Reads the JSON vectorizer model
pub fn load_projector_model(path: &Path) -> AppResult<ProjectorModel> {
    let bytes = read_artifact(path)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        AppError::Artifact(format!("Invalid vectorizer {}: {}", path.display(), e))
    })
}

/// Loads every similarity artifact and assembles the catalog
pub fn load_catalog(
    corpus_path: &Path,
    vectors_path: &Path,
    vectorizer_path: &Path,
) -> AppResult<Catalog> {
    let corpus = load_corpus(corpus_path)?;
    let matrix = load_matrix(vectors_path)?;
    let model = load_projector_model(vectorizer_path)?;

    tracing::info!(
        documents = corpus.len(),
        dimensions = matrix.cols(),
        vocabulary = model.vocabulary.len(),
        "Loaded similarity artifacts"
    );

    Catalog::new(corpus, matrix, model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::recommender::Norm;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn model(dimensions: usize) -> ProjectorModel {
        ProjectorModel {
            dimensions: Some(dimensions),
            vocabulary: [("dream".to_string(), 0)].into_iter().collect(),
            idf: None,
            sublinear_tf: false,
            norm: Norm::L2,
            min_token_len: 2,
            stop_words: HashSet::new(),
        }
    }

    fn corpus(n: usize) -> Vec<CorpusEntry> {
        (0..n)
            .map(|i| CorpusEntry {
                movie_id: i as u64 + 100,
                title: format!("Movie {}", i),
            })
            .collect()
    }

    #[test]
    fn test_catalog_row_count_mismatch() {
        let matrix = DocumentMatrix::from_rows(vec![vec![1.0, 0.0]; 3]).unwrap();
        let result = Catalog::new(corpus(2), matrix, model(2));
        assert!(matches!(result, Err(AppError::Artifact(_))));
    }

    #[test]
    fn test_catalog_dimension_mismatch() {
        let matrix = DocumentMatrix::from_rows(vec![vec![1.0, 0.0]; 2]).unwrap();
        let result = Catalog::new(corpus(2), matrix, model(3));
        assert!(matches!(
            result,
            Err(AppError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_catalog_valid() {
        let matrix = DocumentMatrix::from_rows(vec![vec![1.0, 0.0]; 2]).unwrap();
        let catalog = Catalog::new(corpus(2), matrix, model(2)).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.titles().lookup("movie 1"), Some(1));
        assert_eq!(catalog.index().dimensions(), 2);
        assert_eq!(catalog.projector().dimensions(), 2);
    }

    #[test]
    fn test_load_catalog_from_files() {
        let dir = tempdir().unwrap();
        let corpus_path = dir.path().join("movies.csv");
        let vectors_path = dir.path().join("vectors.bin");
        let vectorizer_path = dir.path().join("vectorizer.json");

        fs::write(
            &corpus_path,
            "movie_id,title,tags\n\
             19995,Avatar,pandora marin\n\
             285,\"Pirates, Part 3\",ocean pirat\n",
        )
        .unwrap();
        let matrix = DocumentMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        save_matrix(&vectors_path, &matrix).unwrap();
        fs::write(
            &vectorizer_path,
            r#"{"vocabulary": {"pandora": 0, "ocean": 1}}"#,
        )
        .unwrap();

        let catalog = load_catalog(&corpus_path, &vectors_path, &vectorizer_path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.corpus()[1].title, "Pirates, Part 3");
        assert_eq!(catalog.corpus()[1].movie_id, 285);
        assert_eq!(catalog.index().top_k_from_row(0, 5), Vec::<usize>::new());
    }

    #[test]
    fn test_load_matrix_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vectors.bin");
        let matrix = DocumentMatrix::from_rows(vec![vec![0.5, 1.5, 2.5]]).unwrap();
        save_matrix(&path, &matrix).unwrap();
        assert_eq!(load_matrix(&path).unwrap(), matrix);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = load_corpus(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(AppError::Artifact(_))));
    }

    #[test]
    fn test_load_invalid_vectorizer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vectorizer.json");
        fs::write(&path, "not json").unwrap();
        assert!(load_projector_model(&path).is_err());
    }
}

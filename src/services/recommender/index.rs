use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::models::CorpusEntry;

/// Dense row-major document-vector matrix
///
/// Row `i` holds the vector of corpus row `i`. Stored on disk with bincode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl DocumentMatrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> AppResult<Self> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            AppError::Artifact(format!("Matrix shape {}x{} overflows", rows, cols))
        })?;
        if expected != data.len() {
            return Err(AppError::Artifact(format!(
                "Matrix declares {}x{} but holds {} values",
                rows,
                cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a matrix from equally sized rows
    pub fn from_rows(rows: Vec<Vec<f32>>) -> AppResult<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = rows.iter().position(|r| r.len() != cols) {
            return Err(AppError::Artifact(format!(
                "Matrix row {} has {} columns, expected {}",
                bad,
                rows[bad].len(),
                cols
            )));
        }
        let count = rows.len();
        Self::new(count, cols, rows.into_iter().flatten().collect())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i >= self.rows {
            return None;
        }
        let start = i * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    /// Validates a matrix decoded from disk, where the fields bypass `new`
    pub(crate) fn validate(self) -> AppResult<Self> {
        Self::new(self.rows, self.cols, self.data)
    }
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine similarity, defined as 0 when either vector has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    cosine_with_norms(a, norm(a), b, norm(b))
}

fn cosine_with_norms(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Nearest-neighbor search over the document matrix
///
/// Results are row indices ordered by descending similarity, ties broken by ascending row.
/// Rows with zero similarity are never returned, so results may be shorter
/// than `k`.
pub trait VectorIndex: Send + Sync {
    /// Feature width of the indexed vectors
    fn dimensions(&self) -> usize;

    /// Number of indexed rows
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn row(&self, row: usize) -> Option<&[f32]>;

    /// Top `k` rows for an arbitrary query vector, optionally skipping one row
    fn top_k(&self, query: &[f32], k: usize, exclude: Option<usize>) -> Vec<usize>;

    /// Top `k` rows similar to an indexed row, never including the row itself
    fn top_k_from_row(&self, row: usize, k: usize) -> Vec<usize> {
        match self.row(row) {
            Some(query) => self.top_k(query, k, Some(row)),
            None => Vec::new(),
        }
    }
}

/// Exhaustive cosine scan over every row
pub struct ExactIndex {
    matrix: DocumentMatrix,
    norms: Vec<f32>,
}

impl ExactIndex {
    pub fn new(matrix: DocumentMatrix) -> Self {
        let norms = (0..matrix.rows())
            .filter_map(|i| matrix.row(i))
            .map(norm)
            .collect();
        Self { matrix, norms }
    }
}

impl VectorIndex for ExactIndex {
    fn dimensions(&self) -> usize {
        self.matrix.cols()
    }

    fn len(&self) -> usize {
        self.matrix.rows()
    }

    fn row(&self, row: usize) -> Option<&[f32]> {
        self.matrix.row(row)
    }

    fn top_k(&self, query: &[f32], k: usize, exclude: Option<usize>) -> Vec<usize> {
        if query.len() != self.dimensions() {
            tracing::warn!(
                query_dims = query.len(),
                index_dims = self.dimensions(),
                "Query width does not match index, returning no neighbors"
            );
            return Vec::new();
        }
        if k == 0 {
            return Vec::new();
        }

        let query_norm = norm(query);
        if query_norm == 0.0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .norms
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != exclude)
            .filter_map(|(i, &row_norm)| {
                let row = self.matrix.row(i)?;
                let sim = cosine_with_norms(query, query_norm, row, row_norm);
                (sim != 0.0).then_some((i, sim))
            })
            .collect();

        scored.sort_by(|(ia, sa), (ib, sb)| sb.total_cmp(sa).then(ia.cmp(ib)));
        scored.truncate(k);
        scored.into_iter().map(|(i, _)| i).collect()
    }
}

/// Lowercase title → corpus row
///
/// Duplicate titles resolve to the last row carrying them.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    rows: HashMap<String, usize>,
}

impl TitleIndex {
    pub fn build(corpus: &[CorpusEntry]) -> Self {
        let rows = corpus
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.title.to_lowercase(), i))
            .collect();
        Self { rows }
    }

    pub fn lookup(&self, title: &str) -> Option<usize> {
        self.rows.get(&title.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

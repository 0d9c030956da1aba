use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{AppError, AppResult};

/// Vector normalization applied after term weighting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    None,
}

fn default_min_token_len() -> usize {
    2
}

/// Pre-fitted vectorizer state, loaded once at startup
///
/// Serialized as JSON next to the document matrix. `idf` is absent for count-only models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectorModel {
    /// Output width; defaults to the vocabulary size
    #[serde(default)]
    pub dimensions: Option<usize>,
    /// Term → column
    pub vocabulary: HashMap<String, usize>,
    #[serde(default)]
    pub idf: Option<Vec<f32>>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: Norm,
    /// Tokens shorter than this are skipped
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    #[serde(default)]
    pub stop_words: HashSet<String>,
}

/// Projects normalized tag strings into the document matrix's column space
#[derive(Debug, Clone)]
pub struct FeatureProjector {
    model: ProjectorModel,
    dimensions: usize,
}

impl FeatureProjector {
    /// Validates the model and wraps it for projection
    pub fn new(model: ProjectorModel) -> AppResult<Self> {
        let dimensions = model.dimensions.unwrap_or(model.vocabulary.len());

        if let Some((term, &column)) = model
            .vocabulary
            .iter()
            .find(|(_, column)| **column >= dimensions)
        {
            return Err(AppError::Artifact(format!(
                "Vocabulary term '{}' maps to column {} but model has {} dimensions",
                term, column, dimensions
            )));
        }

        if let Some(idf) = &model.idf {
            if idf.len() != dimensions {
                return Err(AppError::Artifact(format!(
                    "IDF has {} weights but model has {} dimensions",
                    idf.len(),
                    dimensions
                )));
            }
        }

        Ok(Self { model, dimensions })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Maps a normalized string to a feature vector
    ///
    /// Unknown tokens contribute nothing, so text without known tokens yields the zero vector.
    pub fn project(&self, normalized_text: &str) -> Vec<f32> {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for token in normalized_text.split_whitespace() {
            if token.chars().count() < self.model.min_token_len
                || self.model.stop_words.contains(token)
            {
                continue;
            }
            if let Some(&column) = self.model.vocabulary.get(token) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = vec![0.0f32; self.dimensions];
        for (column, count) in counts {
            let tf = if self.model.sublinear_tf {
                1.0 + count.ln()
            } else {
                count
            };
            let idf = self
                .model
                .idf
                .as_ref()
                .map(|weights| weights[column])
                .unwrap_or(1.0);
            vector[column] = tf * idf;
        }

        if self.model.norm == Norm::L2 {
            let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
            if norm > 0.0 {
                vector.iter_mut().for_each(|v| *v /= norm);
            }
        }

        vector
    }
}

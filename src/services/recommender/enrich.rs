use std::sync::Arc;

use crate::{
    db::MetadataStore,
    models::{CorpusEntry, Recommendation},
};

/// Joins corpus rows to the secondary metadata table
///
/// The join is by lowercase title and is best effort: rows without a metadata match are
/// emitted with their corpus id and title only.
#[derive(Clone)]
pub struct MetadataEnricher {
    corpus: Arc<[CorpusEntry]>,
    metadata: Arc<MetadataStore>,
}

impl MetadataEnricher {
    pub fn new(corpus: Arc<[CorpusEntry]>, metadata: Arc<MetadataStore>) -> Self {
        Self { corpus, metadata }
    }

    /// Enriches rows in order, one record per row
    pub fn enrich(&self, rows: &[usize]) -> Vec<Recommendation> {
        rows.iter()
            .filter_map(|&row| {
                let Some(entry) = self.corpus.get(row) else {
                    tracing::warn!(row, corpus_len = self.corpus.len(), "Row outside corpus");
                    return None;
                };

                let recommendation = match self.metadata.lookup_by_title(&entry.title) {
                    Some(record) => Recommendation::from(record),
                    None => {
                        tracing::debug!(
                            title = %entry.title,
                            "No metadata match, using corpus fields"
                        );
                        Recommendation::minimal(entry)
                    }
                };
                Some(recommendation)
            })
            .collect()
    }
}

//! In-memory vector index with exact cosine search.

use super::corpus::DocumentStore;
use super::embedder::Embedder;
use super::types::{Document, Embedding, SearchResult};
use super::{RagError, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// A read-only index over a document corpus.
///
/// Every document's full text is embedded and normalised once at build time.
/// Search embeds the query the same way and scans all vectors, which is
/// plenty for a corpus of a few dozen documents.
///
/// # Characteristics
///
/// - **Exact**: O(n * d) linear scan, no approximation
/// - **Immutable**: rebuilding means calling [`VectorIndex::build`] again
/// - **Thread-safe**: `Send + Sync`, share it behind an `Arc`
///
/// # Example
///
/// ```
/// # use geoqa_core::rag::{DocumentStore, HashingEmbedder, VectorIndex};
/// # use std::sync::Arc;
/// let index = VectorIndex::build(&DocumentStore::builtin(), Arc::new(HashingEmbedder::new(384))).unwrap();
/// let results = index.search("liquefaction potential from CPT", 3).unwrap();
/// assert_eq!(results.len(), 3);
/// assert_eq!(results[0].rank, 1);
/// ```
pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<(Arc<Document>, Embedding)>,
    dimensions: Option<usize>,
}

impl VectorIndex {
    /// Embeds every document of the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedder fails or returns vectors of differing
    /// lengths.
    pub fn build(store: &DocumentStore, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let mut entries = Vec::with_capacity(store.len());
        let mut dimensions = None;

        for doc in store.documents() {
            let embedding = Embedding::normalized(embedder.embed(&doc.content)?);
            check_dimensions(&mut dimensions, embedding.dimensions())?;
            debug!(id = %doc.id, "Indexed document");
            entries.push((Arc::clone(doc), embedding));
        }

        info!(
            documents = entries.len(),
            embedder = embedder.name(),
            dimensions = dimensions.unwrap_or(0),
            "Built vector index"
        );

        Ok(Self {
            embedder,
            entries,
            dimensions,
        })
    }

    /// Returns up to `k` documents ordered by descending cosine similarity.
    ///
    /// An empty index yields an empty result without embedding the query.
    /// When `k` exceeds the corpus size every document is returned.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = Embedding::normalized(self.embedder.embed(query)?);
        if let Some(expected) = self.dimensions {
            if query_embedding.dimensions() != expected {
                return Err(RagError::DimensionMismatch {
                    expected,
                    actual: query_embedding.dimensions(),
                });
            }
        }

        let mut scored: Vec<(&Arc<Document>, f32)> = self
            .entries
            .iter()
            .map(|(doc, embedding)| (doc, query_embedding.dot(embedding)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let results: Vec<SearchResult> = scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(i, (doc, score))| SearchResult {
                document: Arc::clone(doc),
                score,
                rank: i + 1,
            })
            .collect();

        debug!(results = results.len(), top_score = results.first().map(|r| r.score), "Search complete");
        Ok(results)
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }
}

fn check_dimensions(expected: &mut Option<usize>, actual: usize) -> Result<()> {
    match *expected {
        None => {
            *expected = Some(actual);
            Ok(())
        }
        Some(dims) if dims == actual => Ok(()),
        Some(dims) => Err(RagError::DimensionMismatch {
            expected: dims,
            actual,
        }),
    }
}

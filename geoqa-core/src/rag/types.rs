use std::sync::Arc;

/// A document in the knowledge base.
///
/// Documents are immutable once loaded. The filename doubles as the citation
/// key reported back to callers.
///
/// # Example
///
/// ```
/// # use geoqa_core::rag::Document;
/// let doc = Document::new(
///     "bearing_capacity_fundamentals",
///     "Bearing Capacity Analysis Fundamentals",
///     "bearing_capacity_fundamentals.md",
///     "# Bearing Capacity Analysis Fundamentals ...",
/// );
/// assert_eq!(doc.excerpt(7), "# Beari");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub content: String,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        filename: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// The first `max_chars` characters of the content.
    pub fn excerpt(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((end, _)) => &self.content[..end],
            None => &self.content,
        }
    }
}

/// A unit-length embedding vector.
///
/// Construction normalises to L2 norm 1, so the inner product of two
/// embeddings is their cosine similarity. A zero vector stays zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn normalized(mut values: Vec<f32>) -> Self {
        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut values {
                *v /= norm;
            }
        }
        Self(values)
    }

    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Inner product, equal to cosine similarity for normalised vectors.
    pub fn dot(&self, other: &Embedding) -> f32 {
        self.0.iter().zip(other.0.iter()).map(|(x, y)| x * y).sum()
    }
}

/// A search hit: document, cosine similarity and 1-based rank.
///
/// Returned by [`VectorIndex::search`](super::VectorIndex::search), ordered by
/// descending score. Scores of text embeddings usually fall in 0.0..=1.0 but
/// are not clamped.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub document: Arc<Document>,
    pub score: f32,
    pub rank: usize,
}

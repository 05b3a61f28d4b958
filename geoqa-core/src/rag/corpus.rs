//! The fixed document corpus behind the vector index.

use super::types::Document;
use super::{RagError, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Built-in knowledge base: (id, title, filename, content).
const BUILTIN: &[(&str, &str, &str, &str)] = &[
    (
        "cpt_analysis_basics",
        "CPT Analysis for Settlement in Settle3",
        "cpt_analysis_basics.md",
        include_str!("../../knowledge/cpt_analysis_basics.md"),
    ),
    (
        "liquefaction_analysis",
        "Liquefaction Analysis in Settle3",
        "liquefaction_analysis.md",
        include_str!("../../knowledge/liquefaction_analysis.md"),
    ),
    (
        "settle3_help_overview",
        "Settle3 Software Overview",
        "settle3_help_overview.md",
        include_str!("../../knowledge/settle3_help_overview.md"),
    ),
    (
        "cpt_correlations",
        "CPT Correlations for Geotechnical Parameters",
        "cpt_correlations.md",
        include_str!("../../knowledge/cpt_correlations.md"),
    ),
    (
        "bearing_capacity_fundamentals",
        "Bearing Capacity Analysis Fundamentals",
        "bearing_capacity_fundamentals.md",
        include_str!("../../knowledge/bearing_capacity_fundamentals.md"),
    ),
    (
        "settlement_calculation_methods",
        "Settlement Calculation Methods",
        "settlement_calculation_methods.md",
        include_str!("../../knowledge/settlement_calculation_methods.md"),
    ),
];

/// An immutable, ordered set of documents.
///
/// Loaded once at startup and shared read-only; there is no incremental
/// update.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Arc<Document>>,
}

impl DocumentStore {
    pub fn new(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            documents: documents.into_iter().map(Arc::new).collect(),
        }
    }

    /// The geotechnical corpus compiled into the binary.
    pub fn builtin() -> Self {
        Self::new(BUILTIN.iter().map(|(id, title, filename, content)| {
            Document::new(*id, *title, *filename, content.trim_end())
        }))
    }

    /// Loads every `.md` file in a directory, sorted by filename.
    ///
    /// The id is the file stem and the title is the first `# ` heading, or
    /// the stem when the file has none.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path)?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .ok_or_else(|| RagError::Corpus(format!("invalid path: {}", path.display())))?;
            let id = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| filename.clone());
            let title = content
                .lines()
                .find_map(|line| line.strip_prefix("# "))
                .map(|heading| heading.trim().to_string())
                .unwrap_or_else(|| id.clone());

            debug!(file = %path.display(), "Loaded document");
            documents.push(Document::new(id, title, filename, content.trim_end()));
        }

        info!(dir = %dir.display(), count = documents.len(), "Loaded document corpus");
        Ok(Self::new(documents))
    }

    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Document>> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_document_structure() {
        let store = DocumentStore::builtin();
        assert_eq!(store.len(), 6);
        for doc in store.documents() {
            assert!(!doc.id.is_empty());
            assert!(!doc.title.is_empty());
            assert!(doc.filename.ends_with(".md"));
            assert!(doc.content.starts_with("# "));
        }
        let doc = store.get("bearing_capacity_fundamentals").unwrap();
        assert!(doc.content.contains("Terzaghi"));
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_piles.md"), "# Pile Foundations\n\nDriven piles.").unwrap();
        fs::write(dir.path().join("a_notes.md"), "No heading here.").unwrap();
        fs::write(dir.path().join("ignored.txt"), "# Not markdown").unwrap();

        let store = DocumentStore::from_dir(dir.path()).unwrap();
        assert_eq!(store.len(), 2);

        let first = &store.documents()[0];
        assert_eq!(first.id, "a_notes");
        assert_eq!(first.title, "a_notes");

        let second = &store.documents()[1];
        assert_eq!(second.title, "Pile Foundations");
        assert_eq!(second.filename, "b_piles.md");
    }

    #[test]
    fn test_from_missing_dir() {
        let err = DocumentStore::from_dir(Path::new("/nonexistent/geoqa-docs")).unwrap_err();
        assert!(matches!(err, RagError::Io(_)));
    }
}

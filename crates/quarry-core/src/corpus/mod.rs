//! Documents, anchor declarations and corpus files.
//!
//! Two corpus layouts are accepted:
//! - a QASPER-style object keyed by document id: `{"1912.01214": {"title": .., "abstract": ..}}`
//! - a plain array of `{"id", "title", "abstract"}` records
//!
//! Key order of the object form is preserved; it drives corpus selection and tie-breaking.

mod error;


pub use error::CorpusError;

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Immutable corpus record. Identity is [`Document::id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        abstract_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            abstract_text: abstract_text.into(),
        }
    }

    /// Text fed to the embedder: title and abstract separated by a blank line.
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.title, self.abstract_text)
    }
}

/// Declares that `document_id`'s embedding is the centroid of `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSpec {
    pub category: String,
    pub document_id: String,
}

impl AnchorSpec {
    pub fn new(category: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            document_id: document_id.into(),
        }
    }
}

#[derive(Deserialize)]
struct KeyedFields {
    title: String,
    #[serde(rename = "abstract", default)]
    abstract_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Keyed(IndexMap<String, KeyedFields>),
    List(Vec<Document>),
}

/// Parses a corpus from JSON text.
pub fn parse_corpus(json: &str) -> Result<Vec<Document>, serde_json::Error> {
    let file: CorpusFile = serde_json::from_str(json)?;
    Ok(match file {
        CorpusFile::Keyed(map) => map
            .into_iter()
            .map(|(id, fields)| Document {
                id,
                title: fields.title,
                abstract_text: fields.abstract_text,
            })
            .collect(),
        CorpusFile::List(docs) => docs,
    })
}

/// Loads a corpus file from disk.
pub fn load_corpus(path: &Path) -> Result<Vec<Document>, CorpusError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CorpusError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let docs = parse_corpus(&raw).map_err(|source| CorpusError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), documents = docs.len(), "Loaded corpus");
    Ok(docs)
}

/// Loads `[{"category", "document_id"}]` anchor declarations.
pub fn load_anchors(path: &Path) -> Result<Vec<AnchorSpec>, CorpusError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CorpusError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let anchors: Vec<AnchorSpec> =
        serde_json::from_str(&raw).map_err(|source| CorpusError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), anchors = anchors.len(), "Loaded anchors");
    Ok(anchors)
}

/// Picks the working set: every anchor document first (declaration order), then corpus
/// order until `limit` documents are selected. Duplicate ids are dropped.
///
/// Anchors are always included even when they alone exceed `limit`.
pub fn select_documents(
    corpus: &[Document],
    anchors: &[AnchorSpec],
    limit: usize,
) -> Result<Vec<Document>, CorpusError> {
    let by_id: IndexMap<&str, &Document> = corpus.iter().map(|d| (d.id.as_str(), d)).collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut selected = Vec::with_capacity(limit.min(corpus.len()));

    for anchor in anchors {
        let doc = by_id.get(anchor.document_id.as_str()).ok_or_else(|| {
            CorpusError::UnknownAnchorDocument {
                id: anchor.document_id.clone(),
            }
        })?;
        if seen.insert(doc.id.as_str()) {
            selected.push((*doc).clone());
        }
    }

    for doc in corpus {
        if selected.len() >= limit {
            break;
        }
        if seen.insert(doc.id.as_str()) {
            selected.push(doc.clone());
        }
    }

    debug!(
        corpus = corpus.len(),
        anchors = anchors.len(),
        selected = selected.len(),
        "Selected documents"
    );
    Ok(selected)
}

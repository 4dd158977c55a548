use indexmap::IndexMap;
use serde::Serialize;

use crate::corpus::Document;

/// A document together with its embedding.
#[derive(Debug, Clone)]
pub struct EmbeddedDocument {
    pub document: Document,
    pub vector: Vec<f32>,
}

impl EmbeddedDocument {
    pub fn new(document: Document, vector: Vec<f32>) -> Self {
        Self { document, vector }
    }

    pub fn id(&self) -> &str {
        &self.document.id
    }
}

/// Semantic centroid of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub category: String,
    pub vector: Vec<f32>,
}

impl Anchor {
    pub fn new(category: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            category: category.into(),
            vector,
        }
    }
}

/// A scored (document, category) edge that survived deduplication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub document_id: String,
    pub category: String,
    pub title: String,
    pub similarity: f32,
}

/// Category → ranked assignments, in anchor declaration order.
///
/// A document id appears in at most one category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    categories: IndexMap<String, Vec<Assignment>>,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, category: String, assignments: Vec<Assignment>) {
        self.categories.insert(category, assignments);
    }

    pub fn get(&self, category: &str) -> Option<&[Assignment]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Assignment])> {
        self.categories
            .iter()
            .map(|(category, list)| (category.as_str(), list.as_slice()))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of claimed documents across all categories.
    pub fn assigned_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// All claimed document ids, category by category.
    pub fn document_ids(&self) -> impl Iterator<Item = &str> {
        self.categories
            .values()
            .flat_map(|list| list.iter().map(|a| a.document_id.as_str()))
    }
}

#[derive(Serialize)]
struct ClusteredEntry<'a> {
    id: &'a str,
    title: &'a str,
    similarity: f32,
}

impl Serialize for Partition {
    /// `{category: [{id, title, similarity}]}`, the clustered-dataset export format.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (category, list) in &self.categories {
            let entries: Vec<ClusteredEntry<'_>> = list
                .iter()
                .map(|a| ClusteredEntry {
                    id: &a.document_id,
                    title: &a.title,
                    similarity: a.similarity,
                })
                .collect();
            map.serialize_entry(category, &entries)?;
        }
        map.end()
    }
}

//! Anchor-based partitioning of a corpus into categories.
//!
//! Assignment is greedy and order dependent: anchors are processed in declaration order and
//! each claims its best `top_m` documents not already claimed by an earlier anchor. A
//! document can therefore land in an earlier category even when a later anchor scores it
//! higher. This is not a maximum-weight bipartite matching, and changing the anchor order
//! changes the output.

mod error;
mod types;


pub use error::AssignError;
pub use types::{Anchor, Assignment, EmbeddedDocument, Partition};

use std::collections::HashSet;

use tracing::{debug, info};

use crate::corpus::AnchorSpec;
use crate::similarity::cosine_similarity;

/// Builds anchors from declarations, taking each anchor's vector from its embedded document.
pub fn resolve_anchors(
    specs: &[AnchorSpec],
    documents: &[EmbeddedDocument],
) -> Result<Vec<Anchor>, AssignError> {
    specs
        .iter()
        .map(|spec| {
            documents
                .iter()
                .find(|d| d.id() == spec.document_id)
                .map(|d| Anchor::new(spec.category.clone(), d.vector.clone()))
                .ok_or_else(|| AssignError::AnchorDocumentMissing {
                    category: spec.category.clone(),
                    document_id: spec.document_id.clone(),
                })
        })
        .collect()
}

/// Partitions `documents` among `anchors`, keeping at most `top_m` per category.
///
/// Empty `documents` or `anchors` yield an empty partition. Categories that run out of
/// unclaimed documents keep a short (possibly empty) list.
pub fn assign(
    documents: &[EmbeddedDocument],
    anchors: &[Anchor],
    top_m: usize,
) -> Result<Partition, AssignError> {
    if documents.is_empty() || anchors.is_empty() {
        return Ok(Partition::new());
    }

    let mut labels = HashSet::with_capacity(anchors.len());
    for anchor in anchors {
        if !labels.insert(anchor.category.as_str()) {
            return Err(AssignError::DuplicateAnchor {
                category: anchor.category.clone(),
            });
        }
    }

    let matrix = similarity_matrix(documents, anchors)?;

    let mut claimed: HashSet<&str> = HashSet::with_capacity(documents.len());
    let mut partition = Partition::new();

    for (anchor, scores) in anchors.iter().zip(matrix) {
        let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
        // Stable: equal scores keep document insertion order.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut winners = Vec::with_capacity(top_m.min(ranked.len()));
        for (idx, similarity) in ranked {
            if winners.len() >= top_m {
                break;
            }
            let doc = &documents[idx].document;
            if !claimed.insert(doc.id.as_str()) {
                continue;
            }
            winners.push(Assignment {
                document_id: doc.id.clone(),
                category: anchor.category.clone(),
                title: doc.title.clone(),
                similarity,
            });
        }

        debug!(
            category = %anchor.category,
            claimed = winners.len(),
            "Anchor claimed documents"
        );
        partition.insert(anchor.category.clone(), winners);
    }

    info!(
        documents = documents.len(),
        anchors = anchors.len(),
        assigned = partition.assigned_count(),
        top_m,
        "Partition built"
    );
    Ok(partition)
}

/// Row per anchor, column per document.
fn similarity_matrix(
    documents: &[EmbeddedDocument],
    anchors: &[Anchor],
) -> Result<Vec<Vec<f32>>, AssignError> {
    anchors
        .iter()
        .map(|anchor| {
            documents
                .iter()
                .map(|doc| {
                    cosine_similarity(&doc.vector, &anchor.vector).map_err(|source| {
                        AssignError::Similarity {
                            document_id: doc.id().to_string(),
                            category: anchor.category.clone(),
                            source,
                        }
                    })
                })
                .collect()
        })
        .collect()
}

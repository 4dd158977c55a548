use thiserror::Error;

use crate::similarity::SimilarityError;

#[derive(Debug, Error)]
pub enum AssignError {
    #[error("anchor label '{category}' declared more than once")]
    DuplicateAnchor { category: String },

    #[error("anchor document '{document_id}' for '{category}' has no embedding")]
    AnchorDocumentMissing {
        category: String,
        document_id: String,
    },

    #[error("cannot score document '{document_id}' against '{category}': {source}")]
    Similarity {
        document_id: String,
        category: String,
        #[source]
        source: SimilarityError,
    },
}

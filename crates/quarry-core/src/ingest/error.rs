use thiserror::Error;

use crate::clustering::AssignError;
use crate::corpus::CorpusError;
use crate::embedding::EmbeddingError;
use crate::summarize::SummarizeError;
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("assignment failed: {0}")]
    Assign(#[from] AssignError),

    #[error("category '{category}' maps to the reserved namespace '{namespace}'")]
    ReservedNamespace { category: String, namespace: String },

    #[error("failed to serialize clustered dataset: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("namespace ingestion failed: {0}")]
    Store(#[from] VectorDbError),

    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::generation::GenerationError;
use crate::vectordb::VectorDbError;

/// Why one category produced no summary. Recorded in the report; never aborts the run.
#[derive(Debug, Error)]
pub enum CategoryFailure {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("unparsable generator output: {reason}")]
    Parse { reason: String, raw: String },

    #[error("generator output has no summary")]
    MissingSummary,

    #[error("summary embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Errors that abort summarisation as a whole.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("failed to persist summaries: {0}")]
    Store(#[from] VectorDbError),
}

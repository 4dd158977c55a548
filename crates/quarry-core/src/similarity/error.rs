use thiserror::Error;

/// Invalid inputs to [`cosine_similarity`](super::cosine_similarity).
///
/// Every variant indicates a caller bug: embeddings are never empty, never mismatched and
/// never all-zero when produced by a working embedder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimilarityError {
    #[error("cannot compare empty vectors")]
    EmptyVector,

    #[error("vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("vector has zero magnitude")]
    ZeroMagnitude,

    #[error("vector contains a non-finite component at index {index}")]
    NonFinite { index: usize },
}

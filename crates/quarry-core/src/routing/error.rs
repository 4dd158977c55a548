use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::vectordb::VectorDbError;

/// Errors returned by [`QueryRouter::route`](super::QueryRouter::route).
#[derive(Debug, Error)]
pub enum RouteError {
    /// The query was blank.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No category summary matched (none have been built yet).
    #[error("not found: {0}")]
    NotFound(String),

    /// Stored data does not have the expected shape.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// A collaborator failed or timed out.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl From<EmbeddingError> for RouteError {
    fn from(err: EmbeddingError) -> Self {
        RouteError::UpstreamUnavailable(err.to_string())
    }
}

impl From<VectorDbError> for RouteError {
    fn from(err: VectorDbError) -> Self {
        RouteError::UpstreamUnavailable(err.to_string())
    }
}

use thiserror::Error;

use crate::config::ConfigError;
use crate::embedding::EmbeddingError;
use crate::vectordb::VectorDbError;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to initialize embedder: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("failed to connect vector store: {0}")]
    Store(#[from] VectorDbError),

    #[error("embedder load task failed: {0}")]
    TaskFailed(String),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

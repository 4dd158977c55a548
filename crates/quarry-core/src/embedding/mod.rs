//! Text embedding.
//!
//! - [`bge`] runs a BGE checkpoint through candle (or a deterministic stub).
//! - [`embed_one`] / [`embed_many`] move blocking inference onto the blocking pool under a
//!   deadline.

/// BGE embedder.
pub mod bge;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Tokenizer loading and vector helpers.
pub mod utils;


pub use bge::{BgeConfig, BgeEmbedder};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;

use std::sync::Arc;
use std::time::Duration;

/// Maps text to fixed-length vectors. Implementations are synchronous and may block.
pub trait Embedder: Send + Sync + 'static {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Order-preserving batch embedding.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn embedding_dim(&self) -> usize;

    /// `true` when vectors are synthetic.
    fn is_stub(&self) -> bool {
        false
    }
}

/// Embeds one text on the blocking pool.
pub async fn embed_one<E: Embedder>(
    embedder: &Arc<E>,
    text: String,
    deadline: Duration,
) -> Result<Vec<f32>, EmbeddingError> {
    let embedder = Arc::clone(embedder);
    run_blocking(deadline, move || embedder.embed(&text)).await
}

/// Embeds a batch on the blocking pool; output order matches `texts`.
pub async fn embed_many<E: Embedder>(
    embedder: &Arc<E>,
    texts: Vec<String>,
    deadline: Duration,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let expected = texts.len();
    let embedder = Arc::clone(embedder);
    let vectors = run_blocking(deadline, move || {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        embedder.embed_batch(&refs)
    })
    .await?;

    if vectors.len() != expected {
        return Err(EmbeddingError::InferenceFailed {
            reason: format!("expected {expected} embeddings, got {}", vectors.len()),
        });
    }
    Ok(vectors)
}

async fn run_blocking<T, F>(deadline: Duration, f: F) -> Result<T, EmbeddingError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EmbeddingError> + Send + 'static,
{
    match tokio::time::timeout(deadline, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(EmbeddingError::TaskFailed {
            reason: join_err.to_string(),
        }),
        Err(_) => Err(EmbeddingError::Timeout {
            timeout_ms: deadline.as_millis() as u64,
        }),
    }
}

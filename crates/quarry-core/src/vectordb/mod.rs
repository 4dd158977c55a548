//! Vector store integration (Qdrant, plus an in-memory mock).

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


use std::future::Future;
use std::time::Duration;

pub use client::{QdrantStore, VectorStore};
pub use error::VectorDbError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockVectorStore;
pub use model::{Payload, ScoredHit, StoredPoint, generate_point_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    #[default]
    Cosine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteConsistency {
    /// Wait for the operation to be fully indexed and searchable.
    /// Slow, but ensures read-after-write consistency.
    /// Maps to `wait=true`.
    Strong,
}

impl From<WriteConsistency> for bool {
    fn from(c: WriteConsistency) -> bool {
        matches!(c, WriteConsistency::Strong)
    }
}

/// Runs a store call under a deadline; an elapsed deadline becomes [`VectorDbError::Timeout`].
pub async fn with_deadline<T>(
    operation: &'static str,
    collection: &str,
    deadline: Duration,
    call: impl Future<Output = Result<T, VectorDbError>>,
) -> Result<T, VectorDbError> {
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(VectorDbError::Timeout {
            operation,
            collection: collection.to_string(),
            timeout_ms: deadline.as_millis() as u64,
        }),
    }
}

#[derive(Clone)]
/// Store selected at startup (real or mock).
pub enum StoreBackend {
    /// Real Qdrant-backed store.
    Qdrant(QdrantStore),
    #[cfg(any(test, feature = "mock"))]
    /// In-memory mock store.
    Mock(MockVectorStore),
}

impl StoreBackend {
    /// Builds a backend from a URL (`mock:` URLs require the `mock` feature).
    pub async fn from_url(url: &str, api_key: Option<&str>) -> Result<Self, VectorDbError> {
        if url.starts_with("mock:") {
            #[cfg(any(test, feature = "mock"))]
            {
                let _ = api_key;
                Ok(Self::Mock(MockVectorStore::new()))
            }
            #[cfg(not(any(test, feature = "mock")))]
            {
                let _ = api_key;
                Err(VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: "Mock backend not enabled. Compile with --features mock".to_string(),
                })
            }
        } else {
            Ok(Self::Qdrant(QdrantStore::new(url, api_key).await?))
        }
    }

    pub fn is_mock(&self) -> bool {
        match self {
            StoreBackend::Qdrant(_) => false,
            #[cfg(any(test, feature = "mock"))]
            StoreBackend::Mock(_) => true,
        }
    }
}

impl VectorStore for StoreBackend {
    async fn is_ready(&self) -> bool {
        match self {
            StoreBackend::Qdrant(s) => s.is_ready().await,
            #[cfg(any(test, feature = "mock"))]
            StoreBackend::Mock(s) => s.is_ready().await,
        }
    }

    async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
        metric: DistanceMetric,
    ) -> Result<(), VectorDbError> {
        match self {
            StoreBackend::Qdrant(s) => s.create_collection(name, vector_size, metric).await,
            #[cfg(any(test, feature = "mock"))]
            StoreBackend::Mock(s) => s.create_collection(name, vector_size, metric).await,
        }
    }

    async fn delete_collection(&self, name: &str) -> Result<(), VectorDbError> {
        match self {
            StoreBackend::Qdrant(s) => s.delete_collection(name).await,
            #[cfg(any(test, feature = "mock"))]
            StoreBackend::Mock(s) => s.delete_collection(name).await,
        }
    }

    async fn upsert(
        &self,
        collection: &str,
        points: Vec<StoredPoint>,
        consistency: WriteConsistency,
    ) -> Result<(), VectorDbError> {
        match self {
            StoreBackend::Qdrant(s) => s.upsert(collection, points, consistency).await,
            #[cfg(any(test, feature = "mock"))]
            StoreBackend::Mock(s) => s.upsert(collection, points, consistency).await,
        }
    }

    async fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredHit>, VectorDbError> {
        match self {
            StoreBackend::Qdrant(s) => s.query(collection, vector, limit).await,
            #[cfg(any(test, feature = "mock"))]
            StoreBackend::Mock(s) => s.query(collection, vector, limit).await,
        }
    }

    async fn create_keyword_index(&self, collection: &str, field: &str) -> Result<(), VectorDbError> {
        match self {
            StoreBackend::Qdrant(s) => s.create_keyword_index(collection, field).await,
            #[cfg(any(test, feature = "mock"))]
            StoreBackend::Mock(s) => s.create_keyword_index(collection, field).await,
        }
    }
}

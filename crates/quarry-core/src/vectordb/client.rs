use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, DeleteCollectionBuilder, Distance,
    FieldType, PointStruct, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use tracing::debug;

use super::error::VectorDbError;
use super::model::{ScoredHit, StoredPoint};
use super::{DistanceMetric, WriteConsistency};

impl From<DistanceMetric> for Distance {
    fn from(metric: DistanceMetric) -> Self {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
        }
    }
}

/// Classifies a failed search. Qdrant reports a missing collection as
/// `Not found: Collection `name` doesn't exist!`.
pub(super) fn search_error(collection: &str, message: String) -> VectorDbError {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("not found") || lowered.contains("doesn't exist") {
        VectorDbError::CollectionNotFound {
            collection: collection.to_string(),
        }
    } else {
        VectorDbError::SearchFailed {
            collection: collection.to_string(),
            message,
        }
    }
}

#[derive(Clone)]
/// Qdrant-backed vector store.
pub struct QdrantStore {
    client: Qdrant,
    url: String,
}

impl QdrantStore {
    /// Creates a client for `url`, authenticating with `api_key` when given.
    pub async fn new(url: &str, api_key: Option<&str>) -> Result<Self, VectorDbError> {
        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key {
            builder = builder.api_key(key.to_string());
        }

        let client = builder
            .build()
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Returns the underlying Qdrant client.
    pub fn client(&self) -> &Qdrant {
        &self.client
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Returns `true` if the collection exists.
    pub async fn collection_exists(&self, name: &str) -> Result<bool, VectorDbError> {
        self.client
            .collection_exists(name)
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })
    }

    /// Creates a collection with the given size and metric.
    pub async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
        metric: DistanceMetric,
    ) -> Result<(), VectorDbError> {
        let vectors_config = VectorParamsBuilder::new(vector_size, Distance::from(metric));

        self.client
            .create_collection(CreateCollectionBuilder::new(name).vectors_config(vectors_config))
            .await
            .map_err(|e| VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Deletes a collection. Missing collections are not an error.
    pub async fn delete_collection(&self, name: &str) -> Result<(), VectorDbError> {
        if !self.collection_exists(name).await? {
            debug!(collection = name, "Collection absent, nothing to delete");
            return Ok(());
        }

        self.client
            .delete_collection(DeleteCollectionBuilder::new(name))
            .await
            .map_err(|e| VectorDbError::DeleteCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Upserts points into a collection.
    pub async fn upsert(
        &self,
        collection: &str,
        points: Vec<StoredPoint>,
        consistency: WriteConsistency,
    ) -> Result<(), VectorDbError> {
        if points.is_empty() {
            return Ok(());
        }

        let qdrant_points = points
            .into_iter()
            .map(|p| {
                let payload =
                    qdrant_client::Payload::try_from(serde_json::Value::Object(p.payload))
                        .map_err(|e| VectorDbError::UpsertFailed {
                            collection: collection.to_string(),
                            message: e.to_string(),
                        })?;
                Ok(PointStruct::new(p.id, p.vector, payload))
            })
            .collect::<Result<Vec<_>, VectorDbError>>()?;

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(collection, qdrant_points).wait(consistency.into()),
            )
            .await
            .map_err(|e| VectorDbError::UpsertFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Nearest-neighbour search returning payloads, best first.
    pub async fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredHit>, VectorDbError> {
        let search_result = self
            .client
            .search_points(SearchPointsBuilder::new(collection, vector, limit).with_payload(true))
            .await
            .map_err(|e| search_error(collection, e.to_string()))?;

        Ok(search_result
            .result
            .into_iter()
            .filter_map(ScoredHit::from_scored_point)
            .collect())
    }

    /// Creates a keyword payload index on `field`.
    pub async fn create_keyword_index(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<(), VectorDbError> {
        self.client
            .create_field_index(
                CreateFieldIndexCollectionBuilder::new(collection, field, FieldType::Keyword)
                    .wait(true),
            )
            .await
            .map_err(|e| VectorDbError::IndexFailed {
                collection: collection.to_string(),
                field: field.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

/// Collection-oriented vector store used by the namespace manager and query router.
pub trait VectorStore: Send + Sync {
    /// Returns `true` if the store answers requests.
    fn is_ready(&self) -> impl std::future::Future<Output = bool> + Send;

    /// Creates an empty collection.
    fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
        metric: DistanceMetric,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Deletes a collection; absent collections are a no-op.
    fn delete_collection(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Inserts or overwrites points by id.
    fn upsert(
        &self,
        collection: &str,
        points: Vec<StoredPoint>,
        consistency: WriteConsistency,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Nearest-neighbour search, best first.
    fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> impl std::future::Future<Output = Result<Vec<ScoredHit>, VectorDbError>> + Send;

    /// Creates a keyword payload index.
    fn create_keyword_index(
        &self,
        collection: &str,
        field: &str,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;
}

impl VectorStore for QdrantStore {
    async fn is_ready(&self) -> bool {
        self.health_check().await.is_ok()
    }

    async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
        metric: DistanceMetric,
    ) -> Result<(), VectorDbError> {
        self.create_collection(name, vector_size, metric).await
    }

    async fn delete_collection(&self, name: &str) -> Result<(), VectorDbError> {
        self.delete_collection(name).await
    }

    async fn upsert(
        &self,
        collection: &str,
        points: Vec<StoredPoint>,
        consistency: WriteConsistency,
    ) -> Result<(), VectorDbError> {
        self.upsert(collection, points, consistency).await
    }

    async fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredHit>, VectorDbError> {
        self.query(collection, vector, limit).await
    }

    async fn create_keyword_index(&self, collection: &str, field: &str) -> Result<(), VectorDbError> {
        self.create_keyword_index(collection, field).await
    }
}

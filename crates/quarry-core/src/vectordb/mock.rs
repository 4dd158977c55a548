use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use indexmap::IndexMap;

use crate::similarity::cosine_similarity;
use crate::vectordb::{
    DistanceMetric, Payload, ScoredHit, StoredPoint, VectorDbError, VectorStore, WriteConsistency,
};

const MOCK_URL: &str = "mock://memory";

#[derive(Default, Clone)]
/// In-memory vector store. Clones share state.
pub struct MockVectorStore {
    collections: Arc<std::sync::RwLock<HashMap<String, MockCollection>>>,
    unavailable: Arc<AtomicBool>,
    write_latency_ms: Arc<AtomicU64>,
}

#[derive(Default, Clone)]
struct MockCollection {
    vector_size: u64,
    points: IndexMap<String, MockStoredPoint>,
    indexed_fields: Vec<String>,
}

#[derive(Clone)]
struct MockStoredPoint {
    vector: Vec<f32>,
    payload: Payload,
}

impl MockVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays collection and upsert calls, so concurrent writers can interleave.
    pub fn with_write_latency(self, latency: Duration) -> Self {
        self.write_latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
        self
    }

    /// Makes every subsequent call fail as if the server were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .collections
            .read()
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections
            .read()
            .map(|c| c.contains_key(name))
            .unwrap_or(false)
    }

    pub fn point_count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .ok()?
            .get(collection)
            .map(|c| c.points.len())
    }

    /// Payloads in insertion order.
    pub fn payloads(&self, collection: &str) -> Vec<Payload> {
        self.collections
            .read()
            .ok()
            .and_then(|c| {
                c.get(collection)
                    .map(|coll| coll.points.values().map(|p| p.payload.clone()).collect())
            })
            .unwrap_or_default()
    }

    pub fn indexed_fields(&self, collection: &str) -> Vec<String> {
        self.collections
            .read()
            .ok()
            .and_then(|c| c.get(collection).map(|coll| coll.indexed_fields.clone()))
            .unwrap_or_default()
    }

    async fn simulate_write_latency(&self) {
        let ms = self.write_latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn check_available(&self) -> Result<(), VectorDbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(VectorDbError::ConnectionFailed {
                url: MOCK_URL.to_string(),
                message: "mock store marked unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl VectorStore for MockVectorStore {
    async fn is_ready(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
        _metric: DistanceMetric,
    ) -> Result<(), VectorDbError> {
        self.simulate_write_latency().await;
        self.check_available()?;
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::CreateCollectionFailed {
                    collection: name.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        if collections.contains_key(name) {
            return Err(VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: "collection already exists".to_string(),
            });
        }

        collections.insert(
            name.to_string(),
            MockCollection {
                vector_size,
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), VectorDbError> {
        self.simulate_write_latency().await;
        self.check_available()?;
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::DeleteCollectionFailed {
                    collection: name.to_string(),
                    message: "lock poisoned".to_string(),
                })?;
        collections.remove(name);
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        points: Vec<StoredPoint>,
        _consistency: WriteConsistency,
    ) -> Result<(), VectorDbError> {
        self.simulate_write_latency().await;
        self.check_available()?;
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::UpsertFailed {
                    collection: collection.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        for point in points {
            if point.vector.len() as u64 != coll.vector_size {
                return Err(VectorDbError::InvalidDimension {
                    expected: coll.vector_size as usize,
                    actual: point.vector.len(),
                });
            }

            coll.points.insert(
                point.id,
                MockStoredPoint {
                    vector: point.vector,
                    payload: point.payload,
                },
            );
        }

        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredHit>, VectorDbError> {
        self.check_available()?;
        let collections = self
            .collections
            .read()
            .map_err(|_| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        let coll = collections
            .get(collection)
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: collection.to_string(),
            })?;

        if vector.len() as u64 != coll.vector_size {
            return Err(VectorDbError::InvalidDimension {
                expected: coll.vector_size as usize,
                actual: vector.len(),
            });
        }

        let mut results = coll
            .points
            .iter()
            .map(|(id, p)| -> Result<ScoredHit, VectorDbError> {
                let score = cosine_similarity(&vector, &p.vector).map_err(|e| {
                    VectorDbError::SearchFailed {
                        collection: collection.to_string(),
                        message: e.to_string(),
                    }
                })?;
                Ok(ScoredHit {
                    id: id.clone(),
                    score,
                    payload: p.payload.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit as usize);
        Ok(results)
    }

    async fn create_keyword_index(&self, collection: &str, field: &str) -> Result<(), VectorDbError> {
        self.check_available()?;
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::IndexFailed {
                    collection: collection.to_string(),
                    field: field.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        if !coll.indexed_fields.iter().any(|f| f == field) {
            coll.indexed_fields.push(field.to_string());
        }
        Ok(())
    }
}

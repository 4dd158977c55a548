//! Category namespaces: canonical naming and the collection lifecycle.
//!
//! Every persisted collection is written through a [`NamespaceManager`], which serializes
//! reset and upsert on the same namespace while letting different namespaces proceed
//! concurrently.


use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::constants::{DEFAULT_STORE_TIMEOUT_MS, FALLBACK_NAMESPACE, MAX_NAMESPACE_LEN};
use crate::vectordb::{
    DistanceMetric, StoredPoint, VectorDbError, VectorStore, WriteConsistency, with_deadline,
};

/// Maps a free-form category label to a storage-safe namespace identifier.
///
/// Lowercases, replaces every run of characters outside `[a-z0-9]` with a single `_`,
/// strips leading and trailing underscores and truncates to [`MAX_NAMESPACE_LEN`].
/// Labels with nothing left map to `"unknown"`. Distinct labels may collide.
pub fn canonicalize(label: &str) -> String {
    let lowered = label.trim().to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut in_gap = false;
    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
            in_gap = false;
        } else if !in_gap {
            out.push('_');
            in_gap = true;
        }
    }

    let mut name: String = out.trim_matches('_').chars().take(MAX_NAMESPACE_LEN).collect();
    // truncation can leave a trailing separator
    while name.ends_with('_') {
        name.pop();
    }

    if name.is_empty() {
        FALLBACK_NAMESPACE.to_string()
    } else {
        name
    }
}

/// Owns the lifecycle of persisted namespaces.
pub struct NamespaceManager<S> {
    store: S,
    store_timeout: Duration,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: VectorStore> NamespaceManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_timeout(store, Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS))
    }

    pub fn with_timeout(store: S, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn lock_for(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    /// Deletes `name` if present and recreates it empty with cosine distance.
    pub async fn reset_namespace(&self, name: &str, dim: usize) -> Result<(), VectorDbError> {
        let lock = self.lock_for(name);
        let _guard = lock.lock().await;
        self.reset_locked(name, dim).await
    }

    /// Inserts or overwrites `records` with strong write consistency.
    pub async fn bulk_upsert(
        &self,
        name: &str,
        records: Vec<StoredPoint>,
    ) -> Result<(), VectorDbError> {
        let lock = self.lock_for(name);
        let _guard = lock.lock().await;
        self.upsert_locked(name, records).await
    }

    /// Reset followed by upsert, holding the namespace lock across both.
    ///
    /// A failed upsert leaves the namespace empty; rerunning ingestion is the recovery path.
    pub async fn replace(
        &self,
        name: &str,
        dim: usize,
        records: Vec<StoredPoint>,
    ) -> Result<usize, VectorDbError> {
        let lock = self.lock_for(name);
        let _guard = lock.lock().await;

        let count = records.len();
        self.reset_locked(name, dim).await?;
        self.upsert_locked(name, records).await?;

        info!(namespace = name, points = count, "Namespace replaced");
        Ok(count)
    }

    /// Best-effort keyword payload index.
    pub async fn ensure_keyword_index(&self, name: &str, field: &str) -> Result<(), VectorDbError> {
        with_deadline(
            "create_keyword_index",
            name,
            self.store_timeout,
            self.store.create_keyword_index(name, field),
        )
        .await
    }

    async fn reset_locked(&self, name: &str, dim: usize) -> Result<(), VectorDbError> {
        debug!(namespace = name, dim, "Resetting namespace");
        with_deadline(
            "delete_collection",
            name,
            self.store_timeout,
            self.store.delete_collection(name),
        )
        .await?;
        with_deadline(
            "create_collection",
            name,
            self.store_timeout,
            self.store
                .create_collection(name, dim as u64, DistanceMetric::Cosine),
        )
        .await
    }

    async fn upsert_locked(
        &self,
        name: &str,
        records: Vec<StoredPoint>,
    ) -> Result<(), VectorDbError> {
        if records.is_empty() {
            return Ok(());
        }
        with_deadline(
            "upsert",
            name,
            self.store_timeout,
            self.store.upsert(name, records, WriteConsistency::Strong),
        )
        .await
    }
}

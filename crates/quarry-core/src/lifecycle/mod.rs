//! Process-wide collaborators, built once at startup and handed out explicitly.

mod error;


pub use error::{LifecycleError, LifecycleResult};

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::embedding::{BgeConfig, BgeEmbedder, Embedder};
use crate::generation::GeneratorBackend;
use crate::ingest::{IngestOptions, IngestPipeline};
use crate::namespace::NamespaceManager;
use crate::routing::QueryRouter;
use crate::vectordb::StoreBackend;

/// Embedder, store and generator for one process.
pub struct Services {
    pub embedder: Arc<BgeEmbedder>,
    pub store: StoreBackend,
    pub generator: Arc<GeneratorBackend>,
    namespaces: Arc<NamespaceManager<StoreBackend>>,
    config: Config,
}

impl Services {
    /// Loads the embedder (off the async runtime) and connects the store.
    pub async fn initialize(config: &Config) -> LifecycleResult<Self> {
        let bge = match config.model_path {
            Some(ref path) => BgeConfig::new(path),
            None => BgeConfig::stub(),
        }
        .with_embedding_dim(config.embedding_dim);

        let embedder = tokio::task::spawn_blocking(move || BgeEmbedder::load(bge))
            .await
            .map_err(|e| LifecycleError::TaskFailed(e.to_string()))??;

        let store =
            StoreBackend::from_url(&config.qdrant_url, config.qdrant_api_key.as_deref()).await?;
        let generator = GeneratorBackend::new(&config.generator_model, config.mock_generator);

        info!(
            embedder_stub = embedder.is_stub(),
            embedding_dim = embedder.embedding_dim(),
            store_mock = store.is_mock(),
            generator_mock = generator.is_mock(),
            "Services initialized"
        );

        Ok(Self::from_parts(embedder, store, generator, config.clone()))
    }

    /// Assembles services from already-built collaborators.
    ///
    /// The namespace manager is created here once; every handle returned by
    /// [`Services::namespaces`] shares its per-namespace locks.
    pub fn from_parts(
        embedder: BgeEmbedder,
        store: StoreBackend,
        generator: GeneratorBackend,
        config: Config,
    ) -> Self {
        let namespaces = Arc::new(NamespaceManager::with_timeout(
            store.clone(),
            config.timeouts.store,
        ));
        Self {
            embedder: Arc::new(embedder),
            store,
            generator: Arc::new(generator),
            namespaces,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn query_router(&self) -> QueryRouter<BgeEmbedder, StoreBackend> {
        QueryRouter::new(Arc::clone(&self.embedder), self.store.clone())
            .with_timeouts(self.config.timeouts)
    }

    pub fn namespaces(&self) -> Arc<NamespaceManager<StoreBackend>> {
        Arc::clone(&self.namespaces)
    }

    pub fn ingest_pipeline(&self) -> IngestPipeline<BgeEmbedder, GeneratorBackend, StoreBackend> {
        IngestPipeline::new(
            Arc::clone(&self.embedder),
            Arc::clone(&self.generator),
            self.namespaces(),
            IngestOptions::from(&self.config),
        )
    }

    /// Releases collaborators. Handles cloned out earlier stay valid until dropped.
    pub async fn shutdown(self) {
        let Self {
            embedder,
            store,
            generator,
            namespaces,
            ..
        } = self;
        info!(
            embedder_refs = Arc::strong_count(&embedder),
            generator_refs = Arc::strong_count(&generator),
            namespace_refs = Arc::strong_count(&namespaces),
            "Shutting down services"
        );
        drop(namespaces);
        drop(generator);
        drop(store);
        drop(embedder);
    }
}

//! Quarry library crate (used by the query server, the ingest tool and integration tests).
//!
//! # Public API Surface
//!
//! ## Ingestion
//! - [`load_corpus`], [`load_anchors`], [`select_documents`] - Corpus input
//! - [`assign`], [`resolve_anchors`], [`Partition`] - Anchor-based clustering
//! - [`NamespaceManager`], [`canonicalize`] - Per-category vector namespaces
//! - [`CategorySummarizer`] - One generated, embedded summary per category
//! - [`IngestPipeline`] - The whole run, end to end
//!
//! ## Retrieval
//! - [`QueryRouter`] - Summary lookup, then papers in the matched category
//!
//! ## Collaborators
//! - [`Embedder`], [`BgeEmbedder`] - Text embedding
//! - [`VectorStore`], [`QdrantStore`], [`StoreBackend`] - Vector storage
//! - [`TextGenerator`], [`GenaiGenerator`], [`GeneratorBackend`] - Summary generation
//! - [`Services`] - Startup wiring for all three
//!
//! ## Test/Mock Support
//! [`MockEmbedder`] and [`MockVectorStore`] are available behind
//! `#[cfg(any(test, feature = "mock"))]`. [`MockGenerator`] is always built so it can be
//! selected at runtime with `QUARRY_MOCK_GENERATOR`.

pub mod clustering;
pub mod config;
pub mod constants;
pub mod corpus;
pub mod embedding;
pub mod generation;
pub mod ingest;
pub mod lifecycle;
pub mod namespace;
pub mod routing;
pub mod similarity;
pub mod summarize;
pub mod vectordb;

pub use clustering::{
    Anchor, AssignError, Assignment, EmbeddedDocument, Partition, assign, resolve_anchors,
};
pub use config::{CallTimeouts, Config, ConfigError};
pub use constants::{DEFAULT_EMBEDDING_DIM, SUMMARY_NAMESPACE};
pub use corpus::{
    AnchorSpec, CorpusError, Document, load_anchors, load_corpus, parse_corpus, select_documents,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use embedding::{BgeConfig, BgeEmbedder, Embedder, EmbeddingError, embed_many, embed_one};
pub use generation::{
    GenaiGenerator, GenerationError, GeneratorBackend, MockGenerator, TextGenerator,
};
pub use ingest::{
    IngestError, IngestOptions, IngestPipeline, IngestReport, NamespaceSummary,
    write_clustered_dataset,
};
pub use lifecycle::{LifecycleError, LifecycleResult, Services};
pub use namespace::{NamespaceManager, canonicalize};
pub use routing::{QueryResult, QueryRouter, RelatedPaper, RouteError, SummaryHit};
pub use similarity::{SimilarityError, cosine_similarity};
pub use summarize::{
    CategoryFailure, CategorySummarizer, CategorySummary, SummarizeError, SummaryReport,
    build_prompt, parse_summary,
};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorStore;
pub use vectordb::{
    DistanceMetric, Payload, QdrantStore, ScoredHit, StoreBackend, StoredPoint, VectorDbError,
    VectorStore, WriteConsistency,
};

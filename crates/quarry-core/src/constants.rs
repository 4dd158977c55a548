//! Cross-cutting, shared constants.
//!
//! The embedding dimension is a runtime value (it comes from the loaded model), but every
//! module defaults to [`DEFAULT_EMBEDDING_DIM`] so stub embedders and collections agree.

/// Output dimension of BGE-small-en-v1.5.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Reserved namespace holding one embedded summary per category.
pub const SUMMARY_NAMESPACE: &str = "summarisation";

/// Maximum length of a canonical namespace identifier.
pub const MAX_NAMESPACE_LEN: usize = 63;

/// Namespace used when a label canonicalizes to nothing.
pub const FALLBACK_NAMESPACE: &str = "unknown";

/// Documents kept per category by default.
pub const DEFAULT_TOP_M: usize = 20;

/// Documents selected from the corpus by default (anchors included).
pub const DEFAULT_CORPUS_LIMIT: usize = 200;

/// Documents embedded per batch during ingestion.
pub const EMBED_BATCH_SIZE: usize = 64;

/// Summary hits consulted by the query router.
pub const SUMMARY_LOOKUP_LIMIT: u64 = 1;

/// Related papers returned by the query router.
pub const RELATED_PAPERS_LIMIT: u64 = 5;

/// Concurrent generator calls during summarisation.
pub const DEFAULT_SUMMARY_CONCURRENCY: usize = 4;

pub const DEFAULT_EMBED_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_GENERATE_TIMEOUT_MS: u64 = 120_000;

/// Maximum tokens fed to the embedding model (BERT position limit).
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

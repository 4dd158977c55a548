use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by vector store operations.
pub enum VectorDbError {
    /// Could not connect to the Qdrant endpoint.
    #[error("failed to connect to Qdrant at '{url}': {message}")]
    ConnectionFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Collection creation failed.
    #[error("failed to create collection '{collection}': {message}")]
    CreateCollectionFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Collection deletion failed.
    #[error("failed to delete collection '{collection}': {message}")]
    DeleteCollectionFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Collection does not exist.
    #[error("collection not found: {collection}")]
    CollectionNotFound {
        /// Collection name.
        collection: String,
    },

    /// Upsert failed.
    #[error("failed to upsert points to '{collection}': {message}")]
    UpsertFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Search failed.
    #[error("failed to search in '{collection}': {message}")]
    SearchFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Payload index creation failed.
    #[error("failed to index '{field}' in '{collection}': {message}")]
    IndexFailed {
        /// Collection name.
        collection: String,
        /// Payload field.
        field: String,
        /// Error message.
        message: String,
    },

    /// Vector dimension mismatch.
    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// The call did not finish within its deadline.
    #[error("{operation} on '{collection}' timed out after {timeout_ms}ms")]
    Timeout {
        /// Operation name.
        operation: &'static str,
        /// Collection name.
        collection: String,
        /// Deadline in milliseconds.
        timeout_ms: u64,
    },
}

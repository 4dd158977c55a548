use thiserror::Error;

/// Errors returned by text generators.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The provider rejected or failed the request.
    #[error("generation with model '{model}' failed: {message}")]
    RequestFailed { model: String, message: String },

    /// The provider answered without any text.
    #[error("model '{model}' returned an empty response")]
    EmptyResponse { model: String },

    /// The call did not finish within its deadline.
    #[error("generation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

//! Text generation (chat-model summaries).

pub mod client;
mod error;
pub mod mock;


pub use client::GenaiGenerator;
pub use error::GenerationError;
pub use mock::MockGenerator;

use std::future::Future;

/// Prompt in, text out.
pub trait TextGenerator: Send + Sync + 'static {
    /// `structured_output` asks the provider for a JSON-only answer.
    fn generate(
        &self,
        prompt: &str,
        structured_output: bool,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Generator selected at startup.
#[derive(Debug, Clone)]
pub enum GeneratorBackend {
    Genai(GenaiGenerator),
    Mock(MockGenerator),
}

impl GeneratorBackend {
    pub fn new(model: &str, mock: bool) -> Self {
        if mock {
            Self::Mock(MockGenerator::default())
        } else {
            Self::Genai(GenaiGenerator::new(model))
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Self::Mock(_))
    }
}

impl TextGenerator for GeneratorBackend {
    async fn generate(&self, prompt: &str, structured_output: bool) -> Result<String, GenerationError> {
        match self {
            Self::Genai(g) => g.generate(prompt, structured_output).await,
            Self::Mock(g) => g.generate(prompt, structured_output).await,
        }
    }
}

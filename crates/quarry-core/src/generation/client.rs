use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest, ChatResponseFormat};
use tracing::debug;

use super::{GenerationError, TextGenerator};

/// Chat-model generator (genai; `gemma3:1b` resolves to a local Ollama server).
#[derive(Clone)]
pub struct GenaiGenerator {
    client: Client,
    model: String,
}

impl std::fmt::Debug for GenaiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiGenerator")
            .field("model", &self.model)
            .finish()
    }
}

impl GenaiGenerator {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_client(Client::default(), model)
    }

    pub fn with_client(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for GenaiGenerator {
    async fn generate(&self, prompt: &str, structured_output: bool) -> Result<String, GenerationError> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        let options = structured_output
            .then(|| ChatOptions::default().with_response_format(ChatResponseFormat::JsonMode));

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            structured_output,
            "Sending generation request"
        );

        let response = self
            .client
            .exec_chat(&self.model, request, options.as_ref())
            .await
            .map_err(|e| GenerationError::RequestFailed {
                model: self.model.clone(),
                message: e.to_string(),
            })?;

        match response.first_text() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(GenerationError::EmptyResponse {
                model: self.model.clone(),
            }),
        }
    }
}

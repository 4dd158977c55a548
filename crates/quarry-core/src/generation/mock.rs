use std::sync::Arc;

use super::{GenerationError, TextGenerator};

type Responder = dyn Fn(&str) -> Result<String, GenerationError> + Send + Sync;

/// Offline generator driven by a closure over the prompt.
///
/// The default responder summarises the numbered title lines of the prompt as JSON.
#[derive(Clone)]
pub struct MockGenerator {
    responder: Arc<Responder>,
}

impl std::fmt::Debug for MockGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGenerator").finish_non_exhaustive()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::from_fn(|prompt| {
            let titles = numbered_lines(prompt);
            let summary = if titles.is_empty() {
                "A collection of research papers.".to_string()
            } else {
                format!("Research covering {}.", titles.join("; "))
            };
            Ok(serde_json::json!({ "category": "mock", "summary": summary }).to_string())
        })
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
        }
    }
}

impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, _structured_output: bool) -> Result<String, GenerationError> {
        (self.responder)(prompt)
    }
}

/// Text after `N. ` on lines that start with a number.
fn numbered_lines(prompt: &str) -> Vec<&str> {
    prompt
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (number, rest) = line.split_once(". ")?;
            (!number.is_empty() && number.chars().all(|c| c.is_ascii_digit()))
                .then_some(rest.trim())
        })
        .filter(|rest| !rest.is_empty())
        .collect()
}

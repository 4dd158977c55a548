//! Per-category summaries, embedded into the reserved `summarisation` namespace.
//!
//! For each category the titles are numbered into a prompt, the generator is asked for a
//! short JSON summary, and the summary is embedded. Categories fail independently: a bad
//! answer is logged and recorded in the [`SummaryReport`], the rest of the run continues.
//! The successful summaries then replace the namespace contents in one call.

mod error;

#[cfg(test)]
mod tests;

pub use error::{CategoryFailure, SummarizeError};

use std::sync::Arc;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clustering::Partition;
use crate::config::CallTimeouts;
use crate::constants::{DEFAULT_SUMMARY_CONCURRENCY, SUMMARY_NAMESPACE};
use crate::embedding::{Embedder, embed_one};
use crate::generation::{GenerationError, TextGenerator};
use crate::namespace::NamespaceManager;
use crate::vectordb::{Payload, StoredPoint, VectorStore};

/// Payload field holding the category label in the summaries namespace.
pub const CATEGORY_FIELD: &str = "category";

/// A generated, embedded category summary.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: String,
    pub summary: String,
    pub vector: Vec<f32>,
}

/// The persisted part of a summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub category: String,
    pub summary: String,
}

/// Outcome of one summarisation run, in partition order.
#[derive(Debug, Default)]
pub struct SummaryReport {
    outcomes: Vec<(String, Result<CategorySummary, CategoryFailure>)>,
}

impl SummaryReport {
    pub fn outcomes(&self) -> &[(String, Result<CategorySummary, CategoryFailure>)] {
        &self.outcomes
    }

    /// Successful summaries as persisted.
    pub fn summaries(&self) -> Vec<SummaryRecord> {
        self.outcomes
            .iter()
            .filter_map(|(_, outcome)| outcome.as_ref().ok())
            .map(|s| SummaryRecord {
                category: s.category.clone(),
                summary: s.summary.clone(),
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &CategoryFailure)> {
        self.outcomes
            .iter()
            .filter_map(|(category, outcome)| outcome.as_ref().err().map(|e| (category.as_str(), e)))
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Builds the summarisation prompt for one category.
pub fn build_prompt(category: &str, titles: &[&str]) -> String {
    let numbered = titles
        .iter()
        .enumerate()
        .map(|(i, title)| format!("{}. {}", i + 1, title))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert research assistant.\n\
         Summarize the following paper titles into 4-6 concise sentences, focusing on common \
         themes and research directions.\n\
         Respond with valid JSON containing exactly two fields: \"category\" and \"summary\".\n\
         \"category\" must be exactly: \"{category}\"\n\
         Do not include any other text, markdown blocks, or explanations.\n\n\
         Titles:\n{numbered}\n\n\
         Expected JSON format:\n\
         {{\"category\": \"{category}\", \"summary\": \"Your 4-6 sentence summary here.\"}}\n"
    )
}

#[derive(Deserialize)]
struct GeneratedSummary {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

/// Extracts the summary text from a generator answer, tolerating a Markdown code fence.
pub fn parse_summary(raw: &str) -> Result<String, CategoryFailure> {
    let body = strip_code_fence(raw);
    let parsed: GeneratedSummary =
        serde_json::from_str(body).map_err(|e| CategoryFailure::Parse {
            reason: e.to_string(),
            raw: raw.to_string(),
        })?;

    if let Some(category) = parsed.category.as_deref() {
        debug!(echoed_category = category, "Generator echoed category");
    }

    match parsed.summary {
        Some(summary) if !summary.trim().is_empty() => Ok(summary.trim().to_string()),
        _ => Err(CategoryFailure::MissingSummary),
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string (`json`) on the opening line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Summarises every category of a partition into the summaries namespace.
pub struct CategorySummarizer<E, G, S> {
    embedder: Arc<E>,
    generator: Arc<G>,
    namespaces: Arc<NamespaceManager<S>>,
    concurrency: usize,
    timeouts: CallTimeouts,
}

impl<E, G, S> CategorySummarizer<E, G, S>
where
    E: Embedder,
    G: TextGenerator,
    S: VectorStore,
{
    pub fn new(embedder: Arc<E>, generator: Arc<G>, namespaces: Arc<NamespaceManager<S>>) -> Self {
        Self {
            embedder,
            generator,
            namespaces,
            concurrency: DEFAULT_SUMMARY_CONCURRENCY,
            timeouts: CallTimeouts::default(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_timeouts(mut self, timeouts: CallTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub async fn summarize(&self, partition: &Partition) -> Result<SummaryReport, SummarizeError> {
        let jobs: Vec<(String, Vec<String>)> = partition
            .iter()
            .filter_map(|(category, assignments)| {
                if assignments.is_empty() {
                    debug!(category, "Skipping category with no documents");
                    return None;
                }
                let titles = assignments.iter().map(|a| a.title.clone()).collect();
                Some((category.to_string(), titles))
            })
            .collect();

        info!(
            categories = jobs.len(),
            concurrency = self.concurrency,
            "Generating category summaries"
        );

        let outcomes: Vec<(String, Result<CategorySummary, CategoryFailure>)> =
            futures_util::stream::iter(jobs)
                .map(|(category, titles)| async move {
                    let outcome = self.summarize_category(&category, &titles).await;
                    if let Err(ref e) = outcome {
                        warn!(category = %category, error = %e, "Category summary failed");
                    }
                    (category, outcome)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let created_at = chrono::Utc::now().to_rfc3339();
        let points: Vec<StoredPoint> = outcomes
            .iter()
            .filter_map(|(_, outcome)| outcome.as_ref().ok())
            .map(|s| {
                let mut payload = Payload::new();
                payload.insert(CATEGORY_FIELD.to_string(), s.category.clone().into());
                payload.insert("summary".to_string(), s.summary.clone().into());
                payload.insert("created_at".to_string(), created_at.clone().into());
                StoredPoint::with_random_id(s.vector.clone(), payload)
            })
            .collect();

        let stored = self
            .namespaces
            .replace(SUMMARY_NAMESPACE, self.embedder.embedding_dim(), points)
            .await?;

        if let Err(e) = self
            .namespaces
            .ensure_keyword_index(SUMMARY_NAMESPACE, CATEGORY_FIELD)
            .await
        {
            warn!(error = %e, "Could not index summary categories");
        }

        let report = SummaryReport { outcomes };
        info!(
            stored,
            failed = report.failed(),
            "Category summaries written"
        );
        Ok(report)
    }

    async fn summarize_category(
        &self,
        category: &str,
        titles: &[String],
    ) -> Result<CategorySummary, CategoryFailure> {
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let prompt = build_prompt(category, &refs);

        debug!(category, titles = titles.len(), "Requesting category summary");
        let raw = match tokio::time::timeout(
            self.timeouts.generate,
            self.generator.generate(&prompt, true),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(GenerationError::Timeout {
                    timeout_ms: self.timeouts.generate.as_millis() as u64,
                }
                .into());
            }
        };

        let summary = parse_summary(&raw)?;
        let vector = embed_one(&self.embedder, summary.clone(), self.timeouts.embed).await?;

        Ok(CategorySummary {
            category: category.to_string(),
            summary,
            vector,
        })
    }
}

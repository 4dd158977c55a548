//! End-to-end ingestion: select, embed, assign, export, persist, summarise.

mod error;

#[cfg(test)]
mod tests;

pub use error::IngestError;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::{info, warn};

use crate::clustering::{EmbeddedDocument, Partition, assign, resolve_anchors};
use crate::config::{CallTimeouts, Config};
use crate::constants::{
    DEFAULT_CORPUS_LIMIT, DEFAULT_SUMMARY_CONCURRENCY, DEFAULT_TOP_M, EMBED_BATCH_SIZE,
    SUMMARY_NAMESPACE,
};
use crate::corpus::{AnchorSpec, CorpusError, Document, select_documents};
use crate::embedding::{Embedder, embed_many};
use crate::generation::TextGenerator;
use crate::namespace::{NamespaceManager, canonicalize};
use crate::summarize::{CategorySummarizer, SummaryReport};
use crate::vectordb::{Payload, StoredPoint, VectorStore};

/// Knobs of one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub top_m: usize,
    pub corpus_limit: usize,
    pub summary_concurrency: usize,
    pub timeouts: CallTimeouts,
    /// Where `clustered_dataset.json` goes; `None` skips the export.
    pub output_path: Option<PathBuf>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            top_m: DEFAULT_TOP_M,
            corpus_limit: DEFAULT_CORPUS_LIMIT,
            summary_concurrency: DEFAULT_SUMMARY_CONCURRENCY,
            timeouts: CallTimeouts::default(),
            output_path: None,
        }
    }
}

impl From<&Config> for IngestOptions {
    fn from(config: &Config) -> Self {
        Self {
            top_m: config.top_m,
            corpus_limit: config.corpus_limit,
            summary_concurrency: config.summary_concurrency,
            timeouts: config.timeouts,
            output_path: Some(config.output_path.clone()),
        }
    }
}

/// One persisted category namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceSummary {
    pub category: String,
    pub namespace: String,
    pub points: usize,
}

#[derive(Debug)]
pub struct IngestReport {
    pub selected: usize,
    pub partition: Partition,
    pub namespaces: Vec<NamespaceSummary>,
    pub summaries: SummaryReport,
}

pub struct IngestPipeline<E, G, S> {
    embedder: Arc<E>,
    generator: Arc<G>,
    namespaces: Arc<NamespaceManager<S>>,
    options: IngestOptions,
}

impl<E, G, S> IngestPipeline<E, G, S>
where
    E: Embedder,
    G: TextGenerator,
    S: VectorStore,
{
    pub fn new(
        embedder: Arc<E>,
        generator: Arc<G>,
        namespaces: Arc<NamespaceManager<S>>,
        options: IngestOptions,
    ) -> Self {
        Self {
            embedder,
            generator,
            namespaces,
            options,
        }
    }

    pub async fn run(
        &self,
        corpus: &[Document],
        anchors: &[AnchorSpec],
    ) -> Result<IngestReport, IngestError> {
        let selected = select_documents(corpus, anchors, self.options.corpus_limit)?;
        info!(
            selected = selected.len(),
            anchors = anchors.len(),
            "Embedding documents"
        );

        let embedded = self.embed_documents(selected).await?;
        let resolved = resolve_anchors(anchors, &embedded)?;
        let partition = assign(&embedded, &resolved, self.options.top_m)?;

        let targets = plan_namespaces(&partition)?;

        if let Some(ref path) = self.options.output_path {
            write_clustered_dataset(path, &partition)?;
        }

        let by_id: HashMap<&str, &EmbeddedDocument> =
            embedded.iter().map(|d| (d.id(), d)).collect();
        let dim = self.embedder.embedding_dim();
        let created_at = chrono::Utc::now().to_rfc3339();

        let writes = targets.iter().map(|(category, namespace)| {
            let points = paper_points(&partition, category, &by_id, &created_at);
            async move {
                let count = self.namespaces.replace(namespace, dim, points).await?;
                Ok::<_, IngestError>(NamespaceSummary {
                    category: category.clone(),
                    namespace: namespace.clone(),
                    points: count,
                })
            }
        });
        let namespaces = try_join_all(writes).await?;

        let summaries = CategorySummarizer::new(
            Arc::clone(&self.embedder),
            Arc::clone(&self.generator),
            Arc::clone(&self.namespaces),
        )
        .with_concurrency(self.options.summary_concurrency)
        .with_timeouts(self.options.timeouts)
        .summarize(&partition)
        .await?;

        info!(
            categories = partition.len(),
            assigned = partition.assigned_count(),
            summaries = summaries.succeeded(),
            "Ingestion complete"
        );

        Ok(IngestReport {
            selected: embedded.len(),
            partition,
            namespaces,
            summaries,
        })
    }

    async fn embed_documents(
        &self,
        documents: Vec<Document>,
    ) -> Result<Vec<EmbeddedDocument>, IngestError> {
        let mut embedded = Vec::with_capacity(documents.len());
        for batch in documents.chunks(EMBED_BATCH_SIZE) {
            let texts = batch.iter().map(Document::text).collect();
            let vectors = embed_many(&self.embedder, texts, self.options.timeouts.embed).await?;
            embedded.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(vectors)
                    .map(|(doc, vector)| EmbeddedDocument::new(doc, vector)),
            );
        }
        Ok(embedded)
    }
}

/// Maps each category to its namespace, refusing the reserved summaries namespace.
fn plan_namespaces(partition: &Partition) -> Result<Vec<(String, String)>, IngestError> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    let mut targets = Vec::with_capacity(partition.len());

    for category in partition.categories() {
        let namespace = canonicalize(category);
        if namespace == SUMMARY_NAMESPACE {
            return Err(IngestError::ReservedNamespace {
                category: category.to_string(),
                namespace,
            });
        }
        if let Some(previous) = owners.insert(namespace.clone(), category) {
            warn!(
                namespace = %namespace,
                first = previous,
                second = category,
                "Categories share a namespace; the later one wins"
            );
        }
        targets.push((category.to_string(), namespace));
    }
    Ok(targets)
}

fn paper_points(
    partition: &Partition,
    category: &str,
    by_id: &HashMap<&str, &EmbeddedDocument>,
    created_at: &str,
) -> Vec<StoredPoint> {
    partition
        .get(category)
        .unwrap_or_default()
        .iter()
        .filter_map(|a| by_id.get(a.document_id.as_str()).map(|doc| (a, doc)))
        .map(|(a, doc)| {
            let d = &doc.document;
            let mut payload = Payload::new();
            payload.insert("id".to_string(), d.id.clone().into());
            payload.insert("title".to_string(), d.title.clone().into());
            payload.insert("abstract".to_string(), d.abstract_text.clone().into());
            payload.insert("text".to_string(), d.text().into());
            payload.insert("category".to_string(), category.into());
            payload.insert("cluster_similarity".to_string(), f64::from(a.similarity).into());
            payload.insert("created_at".to_string(), created_at.into());
            StoredPoint::with_random_id(doc.vector.clone(), payload)
        })
        .collect()
}

/// Writes `{category: [{id, title, similarity}]}` as pretty JSON.
pub fn write_clustered_dataset(path: &Path, partition: &Partition) -> Result<(), IngestError> {
    let json = serde_json::to_string_pretty(partition)?;
    std::fs::write(path, json).map_err(|source| CorpusError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), categories = partition.len(), "Wrote clustered dataset");
    Ok(())
}

//! Two-hop query routing: nearest category summary, then nearest papers in that category.

mod error;


pub use error::RouteError;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::CallTimeouts;
use crate::constants::{RELATED_PAPERS_LIMIT, SUMMARY_LOOKUP_LIMIT, SUMMARY_NAMESPACE};
use crate::embedding::{Embedder, embed_one};
use crate::namespace::canonicalize;
use crate::vectordb::{ScoredHit, VectorDbError, VectorStore, with_deadline};

/// The best-matching category summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryHit {
    pub summary: String,
    pub category: String,
    pub score: f32,
}

impl SummaryHit {
    pub fn from_hit(hit: &ScoredHit) -> Result<Self, RouteError> {
        let category = hit
            .str_field("category")
            .ok_or_else(|| RouteError::Invariant("top summary missing category".to_string()))?;

        Ok(Self {
            summary: hit.str_field("summary").unwrap_or_default().to_string(),
            category: category.to_string(),
            score: hit.score,
        })
    }
}

/// A paper returned from the category namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedPaper {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub category: String,
    pub score: f32,
}

impl RelatedPaper {
    pub fn from_hit(hit: &ScoredHit, namespace: &str) -> Result<Self, RouteError> {
        let field = |name: &str| {
            hit.str_field(name).ok_or_else(|| {
                RouteError::Invariant(format!("paper in '{namespace}' missing {name}"))
            })
        };

        Ok(Self {
            id: field("id")?.to_string(),
            title: field("title")?.to_string(),
            abstract_text: hit.str_field("abstract").unwrap_or_default().to_string(),
            category: hit.str_field("category").unwrap_or_default().to_string(),
            score: hit.score,
        })
    }
}

/// Response body of a routed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub query: String,
    #[serde(rename = "match")]
    pub matched: SummaryHit,
    pub related_papers: Vec<RelatedPaper>,
}

/// Stateless per request; the two lookups run in sequence.
pub struct QueryRouter<E, S> {
    embedder: Arc<E>,
    store: S,
    timeouts: CallTimeouts,
}

impl<E, S> QueryRouter<E, S>
where
    E: Embedder,
    S: VectorStore,
{
    pub fn new(embedder: Arc<E>, store: S) -> Self {
        Self {
            embedder,
            store,
            timeouts: CallTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: CallTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<E> {
        &self.embedder
    }

    #[instrument(skip(self), fields(query_len = query.len()))]
    pub async fn route(&self, query: &str) -> Result<QueryResult, RouteError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RouteError::InvalidInput("query must not be empty".to_string()));
        }

        let vector = embed_one(&self.embedder, query.to_string(), self.timeouts.embed).await?;

        let summaries = match self
            .search(SUMMARY_NAMESPACE, vector.clone(), SUMMARY_LOOKUP_LIMIT)
            .await
        {
            Err(VectorDbError::CollectionNotFound { .. }) => Vec::new(),
            other => other?,
        };
        let top = summaries
            .first()
            .ok_or_else(|| RouteError::NotFound("no matching category summary".to_string()))?;
        let matched = SummaryHit::from_hit(top)?;

        let namespace = canonicalize(&matched.category);
        debug!(
            category = %matched.category,
            namespace = %namespace,
            score = matched.score,
            "Routed query to category"
        );

        let hits = self
            .search(&namespace, vector, RELATED_PAPERS_LIMIT)
            .await
            .map_err(|e| match e {
                VectorDbError::CollectionNotFound { collection } => RouteError::Invariant(format!(
                    "summary category '{}' has no namespace '{collection}'",
                    matched.category
                )),
                other => other.into(),
            })?;

        let related_papers = hits
            .iter()
            .map(|hit| RelatedPaper::from_hit(hit, &namespace))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryResult {
            query: query.to_string(),
            matched,
            related_papers,
        })
    }

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredHit>, VectorDbError> {
        with_deadline(
            "query",
            collection,
            self.timeouts.store,
            self.store.query(collection, vector, limit),
        )
        .await
    }
}

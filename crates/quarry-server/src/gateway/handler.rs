use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::{debug, instrument};

use quarry::embedding::Embedder;
use quarry::routing::QueryResult;
use quarry::vectordb::VectorStore;

use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;

#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    pub query: Option<String>,
}

/// `GET /query?q=...`
#[instrument(skip(state, params))]
pub async fn query_handler<E, S>(
    State(state): State<HandlerState<E, S>>,
    Query(params): Query<QueryParams>,
) -> Result<Json<QueryResult>, GatewayError>
where
    E: Embedder,
    S: VectorStore + 'static,
{
    let query = required_query(params.q)?;
    run_query(&state, &query).await
}

/// `POST /query`; the query string wins over a JSON body `{"query": "..."}`.
#[instrument(skip(state, params, body))]
pub async fn query_post_handler<E, S>(
    State(state): State<HandlerState<E, S>>,
    Query(params): Query<QueryParams>,
    body: Bytes,
) -> Result<Json<QueryResult>, GatewayError>
where
    E: Embedder,
    S: VectorStore + 'static,
{
    let from_body = if params.q.is_none() && !body.is_empty() {
        let parsed: QueryBody = serde_json::from_slice(&body)
            .map_err(|e| GatewayError::InvalidRequest(format!("invalid JSON body: {e}")))?;
        parsed.query
    } else {
        None
    };

    let query = required_query(params.q.or(from_body))?;
    run_query(&state, &query).await
}

pub(crate) fn required_query(raw: Option<String>) -> Result<String, GatewayError> {
    match raw {
        Some(q) if !q.trim().is_empty() => Ok(q),
        Some(_) => Err(GatewayError::InvalidRequest(
            "query must not be empty".to_string(),
        )),
        None => Err(GatewayError::InvalidRequest(
            "missing query parameter `q`".to_string(),
        )),
    }
}

async fn run_query<E, S>(
    state: &HandlerState<E, S>,
    query: &str,
) -> Result<Json<QueryResult>, GatewayError>
where
    E: Embedder,
    S: VectorStore + 'static,
{
    let result = state.router.route(query).await?;
    debug!(
        category = %result.matched.category,
        papers = result.related_papers.len(),
        "Query routed"
    );
    Ok(Json(result))
}

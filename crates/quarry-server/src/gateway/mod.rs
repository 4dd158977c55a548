//! HTTP gateway (Axum) for category-routed queries.
//!
//! This module is primarily used by the `quarry` server binary.

pub mod error;
pub mod handler;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{query_handler, query_post_handler};
pub use state::HandlerState;

use quarry::embedding::Embedder;
use quarry::vectordb::VectorStore;

const STATUS_READY: &str = "ready";
const STATUS_PENDING: &str = "pending";

pub fn create_router_with_state<E, S>(state: HandlerState<E, S>) -> Router
where
    E: Embedder,
    S: VectorStore + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/query", get(query_handler).post(query_post_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub vectordb: &'static str,
    pub embedder_mode: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<E, S>(State(state): State<HandlerState<E, S>>) -> Response
where
    E: Embedder,
    S: VectorStore + 'static,
{
    let vectordb = if state.router.store().is_ready().await {
        STATUS_READY
    } else {
        STATUS_PENDING
    };
    let embedder_mode = if state.router.embedder().is_stub() {
        "stub"
    } else {
        "real"
    };

    let is_ready = vectordb == STATUS_READY;
    let (status_code, status) = if is_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, STATUS_PENDING)
    };

    (
        status_code,
        Json(ReadyResponse {
            status,
            components: ComponentStatus {
                http: STATUS_READY,
                vectordb,
                embedder_mode,
            },
        }),
    )
        .into_response()
}

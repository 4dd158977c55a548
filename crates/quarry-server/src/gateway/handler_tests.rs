use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use crate::gateway::create_router_with_state;
use crate::gateway::error::GatewayError;
use crate::gateway::handler::required_query;
use crate::gateway::state::HandlerState;
use quarry::constants::SUMMARY_NAMESPACE;
use quarry::embedding::MockEmbedder;
use quarry::routing::{QueryRouter, RouteError};
use quarry::vectordb::{
    DistanceMetric, MockVectorStore, Payload, StoredPoint, VectorStore, WriteConsistency,
};

const DIM: u64 = 3;

fn point(fields: &[(&str, &str)], vector: Vec<f32>) -> StoredPoint {
    let mut payload = Payload::new();
    for (k, v) in fields {
        payload.insert(k.to_string(), (*v).into());
    }
    StoredPoint::with_random_id(vector, payload)
}

async fn put(store: &MockVectorStore, collection: &str, points: Vec<StoredPoint>) {
    store
        .create_collection(collection, DIM, DistanceMetric::Cosine)
        .await
        .unwrap();
    store
        .upsert(collection, points, WriteConsistency::Strong)
        .await
        .unwrap();
}

async fn seeded_store() -> MockVectorStore {
    let store = MockVectorStore::new();
    put(
        &store,
        SUMMARY_NAMESPACE,
        vec![
            point(
                &[("category", "Bio"), ("summary", "Living systems.")],
                vec![1.0, 0.0, 0.0],
            ),
            point(
                &[("category", "Physics"), ("summary", "Matter.")],
                vec![0.0, 1.0, 0.0],
            ),
        ],
    )
    .await;

    let bio = (0..6)
        .map(|i| {
            let id = format!("b{i}");
            let fields = [
                ("id", id.as_str()),
                ("title", "Folding"),
                ("abstract", "Chains."),
                ("category", "Bio"),
            ];
            point(&fields, vec![1.0, 0.1 * i as f32, 0.0])
        })
        .collect();
    put(&store, "bio", bio).await;
    store
}

fn embedder() -> Arc<MockEmbedder> {
    Arc::new(MockEmbedder::new(DIM as usize).with_vector("protein folding", vec![1.0, 0.0, 0.0]))
}

fn app(store: MockVectorStore) -> Router {
    create_router_with_state(HandlerState::new(QueryRouter::new(embedder(), store)))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_get_query_routes_to_category() {
    let (status, json) = send(app(seeded_store().await), get("/query?q=protein%20folding")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["query"], "protein folding");
    assert_eq!(json["match"]["category"], "Bio");
    assert_eq!(json["match"]["summary"], "Living systems.");

    let papers = json["related_papers"].as_array().unwrap();
    assert_eq!(papers.len(), 5);
    assert_eq!(papers[0]["id"], "b0");
    assert_eq!(papers[0]["abstract"], "Chains.");
    let scores: Vec<f64> = papers.iter().map(|p| p["score"].as_f64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_missing_q_is_bad_request() {
    let (status, json) = send(app(seeded_store().await), get("/query")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("q"));
}

#[tokio::test]
async fn test_blank_q_is_bad_request() {
    let (status, _) = send(app(seeded_store().await), get("/query?q=%20%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_summaries_is_not_found() {
    let store = MockVectorStore::new();
    put(&store, SUMMARY_NAMESPACE, Vec::new()).await;

    let (status, json) = send(app(store), get("/query?q=protein%20folding")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, serde_json::json!({"error": "No matching summaries found"}));
}

#[tokio::test]
async fn test_store_outage_is_internal_error() {
    let store = seeded_store().await;
    store.set_unavailable(true);

    let (status, json) = send(app(store), get("/query?q=protein%20folding")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_missing_category_namespace_is_internal_error() {
    let store = MockVectorStore::new();
    put(
        &store,
        SUMMARY_NAMESPACE,
        vec![point(&[("category", "Chemistry")], vec![1.0, 0.0, 0.0])],
    )
    .await;

    let (status, _) = send(app(store), get("/query?q=protein%20folding")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_post_json_body() {
    let (status, json) = send(
        app(seeded_store().await),
        post_json("/query", r#"{"query": "protein folding"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["match"]["category"], "Bio");
}

#[tokio::test]
async fn test_post_prefers_query_string() {
    let (status, json) = send(
        app(seeded_store().await),
        post_json("/query?q=protein%20folding", r#"{"query": "ignored"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["query"], "protein folding");
}

#[tokio::test]
async fn test_post_invalid_json_is_bad_request() {
    let (status, _) = send(app(seeded_store().await), post_json("/query", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_without_query_is_bad_request() {
    let (status, _) = send(app(seeded_store().await), post_json("/query", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_healthz() {
    let (status, json) = send(app(MockVectorStore::new()), get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_ready_reports_embedder_mode() {
    let (status, json) = send(app(MockVectorStore::new()), get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["components"]["vectordb"], "ready");
    assert_eq!(json["components"]["embedder_mode"], "stub");
}

#[tokio::test]
async fn test_ready_pending_when_store_down() {
    let store = MockVectorStore::new();
    store.set_unavailable(true);

    let (status, json) = send(app(store), get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "pending");
}

#[test]
fn test_route_error_mapping() {
    assert!(matches!(
        GatewayError::from(RouteError::NotFound("x".into())),
        GatewayError::NoMatch
    ));
    assert!(matches!(
        GatewayError::from(RouteError::InvalidInput("x".into())),
        GatewayError::InvalidRequest(_)
    ));
    assert!(matches!(
        GatewayError::from(RouteError::Invariant("x".into())),
        GatewayError::InternalError(_)
    ));
    assert!(matches!(
        GatewayError::from(RouteError::UpstreamUnavailable("x".into())),
        GatewayError::Upstream(_)
    ));
}

#[test]
fn test_required_query() {
    assert_eq!(required_query(Some("a".into())).unwrap(), "a");
    assert!(required_query(Some(" ".into())).is_err());
    assert!(required_query(None).is_err());
}

use super::*;
use crate::embedding::MockEmbedder;
use crate::generation::MockGenerator;
use crate::vectordb::MockVectorStore;

fn corpus() -> Vec<(Document, Vec<f32>)> {
    vec![
        (
            Document::new("b1", "Protein folding", "How chains fold."),
            vec![1.0, 0.0],
        ),
        (
            Document::new("p1", "Black holes", "Event horizons."),
            vec![0.0, 1.0],
        ),
        (
            Document::new("b2", "Gene regulation", "Switching genes."),
            vec![0.9, 0.2],
        ),
        (
            Document::new("p2", "Dark matter", "Missing mass."),
            vec![0.1, 0.9],
        ),
    ]
}

fn embedder() -> Arc<MockEmbedder> {
    let embedder = corpus()
        .into_iter()
        .fold(MockEmbedder::new(2), |e, (doc, v)| e.with_vector(doc.text(), v));
    Arc::new(embedder)
}

fn documents() -> Vec<Document> {
    corpus().into_iter().map(|(d, _)| d).collect()
}

fn anchors() -> Vec<AnchorSpec> {
    vec![AnchorSpec::new("Bio", "b1"), AnchorSpec::new("Physics", "p1")]
}

fn pipeline(
    store: &MockVectorStore,
    options: IngestOptions,
) -> IngestPipeline<MockEmbedder, MockGenerator, MockVectorStore> {
    IngestPipeline::new(
        embedder(),
        Arc::new(MockGenerator::default()),
        Arc::new(NamespaceManager::new(store.clone())),
        options,
    )
}

fn options(top_m: usize) -> IngestOptions {
    IngestOptions {
        top_m,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_full_run_populates_category_and_summary_namespaces() {
    let store = MockVectorStore::new();

    let report = pipeline(&store, options(2))
        .run(&documents(), &anchors())
        .await
        .unwrap();

    assert_eq!(report.selected, 4);
    assert_eq!(
        report.namespaces,
        vec![
            NamespaceSummary {
                category: "Bio".to_string(),
                namespace: "bio".to_string(),
                points: 2,
            },
            NamespaceSummary {
                category: "Physics".to_string(),
                namespace: "physics".to_string(),
                points: 2,
            },
        ]
    );
    assert_eq!(report.summaries.succeeded(), 2);
    assert_eq!(
        store.collection_names(),
        vec!["bio", "physics", SUMMARY_NAMESPACE]
    );

    let bio = store.payloads("bio");
    assert_eq!(bio[0]["id"], "b1");
    assert_eq!(bio[0]["title"], "Protein folding");
    assert_eq!(bio[0]["abstract"], "How chains fold.");
    assert_eq!(bio[0]["text"], "Protein folding\n\nHow chains fold.");
    assert_eq!(bio[0]["category"], "Bio");
    assert!((bio[0]["cluster_similarity"].as_f64().unwrap() - 1.0).abs() < 1e-6);
    assert!(bio[0]["created_at"].is_string());
    assert_eq!(bio[1]["id"], "b2");
}

#[tokio::test]
async fn test_writes_clustered_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clustered_dataset.json");
    let store = MockVectorStore::new();

    pipeline(
        &store,
        IngestOptions {
            output_path: Some(path.clone()),
            ..options(2)
        },
    )
    .run(&documents(), &anchors())
    .await
    .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let bio = json["Bio"].as_array().unwrap();
    assert_eq!(bio.len(), 2);
    assert_eq!(bio[0]["id"], "b1");
    assert_eq!(bio[0]["title"], "Protein folding");
    assert!(bio[0]["similarity"].is_number());
    assert_eq!(json["Physics"][0]["id"], "p1");
}

#[tokio::test]
async fn test_reserved_category_aborts_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clustered_dataset.json");
    let store = MockVectorStore::new();
    let anchors = vec![
        AnchorSpec::new("Bio", "b1"),
        AnchorSpec::new("Summarisation", "p1"),
    ];

    let err = pipeline(
        &store,
        IngestOptions {
            output_path: Some(path.clone()),
            ..options(2)
        },
    )
    .run(&documents(), &anchors)
    .await
    .unwrap_err();

    assert!(matches!(err, IngestError::ReservedNamespace { .. }));
    assert!(store.collection_names().is_empty());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_unknown_anchor_document() {
    let store = MockVectorStore::new();
    let err = pipeline(&store, options(2))
        .run(&documents(), &[AnchorSpec::new("Bio", "nope")])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IngestError::Corpus(CorpusError::UnknownAnchorDocument { .. })
    ));
}

#[tokio::test]
async fn test_duplicate_anchor_label() {
    let store = MockVectorStore::new();
    let anchors = vec![AnchorSpec::new("Bio", "b1"), AnchorSpec::new("Bio", "b2")];
    let err = pipeline(&store, options(2))
        .run(&documents(), &anchors)
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Assign(_)));
}

#[tokio::test]
async fn test_corpus_limit_keeps_anchors() {
    let store = MockVectorStore::new();
    let report = pipeline(
        &store,
        IngestOptions {
            corpus_limit: 2,
            ..options(1)
        },
    )
    .run(&documents(), &anchors())
    .await
    .unwrap();

    assert_eq!(report.selected, 2);
    assert_eq!(report.partition.assigned_count(), 2);
    assert_eq!(store.point_count("bio"), Some(1));
    assert_eq!(store.point_count("physics"), Some(1));
}

#[tokio::test]
async fn test_rerun_replaces_namespaces() {
    let store = MockVectorStore::new();
    let p = pipeline(&store, options(2));

    p.run(&documents(), &anchors()).await.unwrap();
    p.run(&documents(), &anchors()).await.unwrap();

    assert_eq!(store.point_count("bio"), Some(2));
    assert_eq!(store.point_count("physics"), Some(2));
    assert_eq!(store.point_count(SUMMARY_NAMESPACE), Some(2));
}

#[tokio::test]
async fn test_store_outage_fails_ingestion() {
    let store = MockVectorStore::new();
    store.set_unavailable(true);
    let err = pipeline(&store, options(2))
        .run(&documents(), &anchors())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Store(_)));
}

#[test]
fn test_plan_namespaces_warns_but_allows_collisions() {
    let mut partition = Partition::new();
    partition.insert("Bio".to_string(), Vec::new());
    partition.insert("BIO!".to_string(), Vec::new());

    let targets = plan_namespaces(&partition).unwrap();
    assert_eq!(targets[0].1, "bio");
    assert_eq!(targets[1].1, "bio");
}

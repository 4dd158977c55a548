//! Corpus files on disk through the full ingestion pipeline against the in-memory store.

mod common;

use std::sync::Arc;

use common::fixtures::{anchors, qasper_corpus, vector_for, write_json};
use quarry::config::Config;
use quarry::constants::SUMMARY_NAMESPACE;
use quarry::corpus::{load_anchors, load_corpus};
use quarry::embedding::MockEmbedder;
use quarry::generation::MockGenerator;
use quarry::ingest::{IngestOptions, IngestPipeline};
use quarry::namespace::NamespaceManager;
use quarry::routing::QueryRouter;
use quarry::vectordb::MockVectorStore;

#[tokio::test]
async fn test_files_to_namespaces_and_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = write_json(dir.path(), "qasper.json", &qasper_corpus());
    let anchors_path = write_json(dir.path(), "anchors.json", &anchors());

    let corpus = load_corpus(&corpus_path).unwrap();
    let anchors = load_anchors(&anchors_path).unwrap();
    assert_eq!(corpus.len(), 5);
    assert_eq!(corpus[0].id, "bio-1");

    let embedder = corpus
        .iter()
        .fold(MockEmbedder::new(3), |e, d| e.with_vector(d.text(), vector_for(&d.id)));
    let embedder = Arc::new(embedder.with_vector("cells and proteins", vec![1.0, 0.05, 0.0]));

    let config = Config {
        top_m: 2,
        output_path: dir.path().join("clustered_dataset.json"),
        ..Config::default()
    };
    let store = MockVectorStore::new();

    let report = IngestPipeline::new(
        Arc::clone(&embedder),
        Arc::new(MockGenerator::default()),
        Arc::new(NamespaceManager::new(store.clone())),
        IngestOptions::from(&config),
    )
    .run(&corpus, &anchors)
    .await
    .unwrap();

    assert_eq!(report.selected, 5);
    assert_eq!(report.partition.assigned_count(), 4);
    assert_eq!(store.point_count("biology"), Some(2));
    assert_eq!(store.point_count("physics"), Some(2));
    assert_eq!(store.point_count(SUMMARY_NAMESPACE), Some(2));

    let dataset: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.output_path).unwrap()).unwrap();
    let biology: Vec<&str> = dataset["Biology"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(biology, vec!["bio-1", "bio-2"]);

    let result = QueryRouter::new(embedder, store)
        .route("cells and proteins")
        .await
        .unwrap();
    assert!(
        result
            .related_papers
            .iter()
            .all(|p| p.category == result.matched.category)
    );
    assert!(result.related_papers.len() <= 2);
}

#[tokio::test]
async fn test_unreferenced_anchor_file_entry_fails() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = write_json(dir.path(), "qasper.json", &qasper_corpus());
    let anchors_path = write_json(
        dir.path(),
        "anchors.json",
        &serde_json::json!([{"category": "Chemistry", "document_id": "chem-9"}]),
    );

    let corpus = load_corpus(&corpus_path).unwrap();
    let anchors = load_anchors(&anchors_path).unwrap();
    let store = MockVectorStore::new();

    let result = IngestPipeline::new(
        Arc::new(MockEmbedder::new(3)),
        Arc::new(MockGenerator::default()),
        Arc::new(NamespaceManager::new(store.clone())),
        IngestOptions::default(),
    )
    .run(&corpus, &anchors)
    .await;

    assert!(result.is_err());
    assert!(store.collection_names().is_empty());
}

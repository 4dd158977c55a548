use super::*;
use crate::clustering::Assignment;
use crate::embedding::MockEmbedder;
use crate::generation::MockGenerator;
use crate::vectordb::MockVectorStore;
use std::time::Duration;

const DIM: usize = 8;

fn assignment(id: &str, category: &str, title: &str) -> Assignment {
    Assignment {
        document_id: id.to_string(),
        category: category.to_string(),
        title: title.to_string(),
        similarity: 0.9,
    }
}

fn partition(categories: Vec<(&str, Vec<&str>)>) -> Partition {
    let mut partition = Partition::new();
    for (category, titles) in categories {
        let list = titles
            .iter()
            .enumerate()
            .map(|(i, t)| assignment(&format!("{category}-{i}"), category, t))
            .collect();
        partition.insert(category.to_string(), list);
    }
    partition
}

fn summarizer<G: TextGenerator>(
    generator: G,
    store: &MockVectorStore,
) -> CategorySummarizer<MockEmbedder, G, MockVectorStore> {
    CategorySummarizer::new(
        Arc::new(MockEmbedder::new(DIM)),
        Arc::new(generator),
        Arc::new(NamespaceManager::new(store.clone())),
    )
}

/// Answers with a JSON summary, except for prompts naming `broken`.
fn selective_generator() -> MockGenerator {
    MockGenerator::from_fn(|prompt| {
        if prompt.contains("\"broken\"") {
            Ok("I cannot answer that as JSON".to_string())
        } else {
            Ok(r#"{"category": "x", "summary": "Themes of the field."}"#.to_string())
        }
    })
}

mod prompt_tests {
    use super::*;

    #[test]
    fn test_prompt_numbers_titles_and_names_category() {
        let prompt = build_prompt("Bio", &["Protein folding", "Gene regulation"]);
        assert!(prompt.contains("1. Protein folding\n2. Gene regulation"));
        assert!(prompt.contains("\"category\" must be exactly: \"Bio\""));
        assert!(prompt.contains("4-6 concise sentences"));
        assert!(prompt.contains(r#"{"category": "Bio", "summary":"#));
    }

    #[test]
    fn test_parse_plain_json() {
        let summary = parse_summary(r#"{"category":"Bio","summary":" Cells. "}"#).unwrap();
        assert_eq!(summary, "Cells.");
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"category\": \"Bio\", \"summary\": \"Cells.\"}\n```";
        assert_eq!(parse_summary(raw).unwrap(), "Cells.");

        let raw = "```\n{\"summary\": \"Atoms.\"}\n```\n";
        assert_eq!(parse_summary(raw).unwrap(), "Atoms.");
    }

    #[test]
    fn test_parse_rejects_prose() {
        let err = parse_summary("Sure! Here is a summary.").unwrap_err();
        assert!(matches!(err, CategoryFailure::Parse { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_or_blank_summary() {
        assert!(matches!(
            parse_summary(r#"{"category":"Bio"}"#).unwrap_err(),
            CategoryFailure::MissingSummary
        ));
        assert!(matches!(
            parse_summary(r#"{"category":"Bio","summary":"   "}"#).unwrap_err(),
            CategoryFailure::MissingSummary
        ));
        assert!(matches!(
            parse_summary(r#"{"summary":null}"#).unwrap_err(),
            CategoryFailure::MissingSummary
        ));
    }
}

#[tokio::test]
async fn test_summarize_all_categories() {
    let store = MockVectorStore::new();
    let partition = partition(vec![
        ("Bio", vec!["Protein folding", "Gene regulation"]),
        ("Physics", vec!["Quantum entanglement"]),
    ]);

    let report = summarizer(MockGenerator::default(), &store)
        .summarize(&partition)
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 0);

    let summaries = report.summaries();
    assert_eq!(summaries[0].category, "Bio");
    assert!(summaries[0].summary.contains("Protein folding"));
    assert_eq!(summaries[1].category, "Physics");

    let payloads = store.payloads(SUMMARY_NAMESPACE);
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0]["category"], "Bio");
    assert!(payloads[0]["created_at"].is_string());
    assert_eq!(store.indexed_fields(SUMMARY_NAMESPACE), vec![CATEGORY_FIELD]);
}

#[tokio::test]
async fn test_one_unparsable_category_does_not_fail_the_run() {
    let store = MockVectorStore::new();
    let partition = partition(vec![
        ("Bio", vec!["Protein folding"]),
        ("broken", vec!["Something odd"]),
        ("Physics", vec!["Quantum entanglement"]),
    ]);

    let report = summarizer(selective_generator(), &store)
        .summarize(&partition)
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures[0].0, "broken");
    assert!(matches!(failures[0].1, CategoryFailure::Parse { .. }));

    let categories: Vec<String> = report.summaries().into_iter().map(|s| s.category).collect();
    assert_eq!(categories, vec!["Bio", "Physics"]);
    assert_eq!(store.point_count(SUMMARY_NAMESPACE), Some(2));
}

#[tokio::test]
async fn test_generator_error_is_recorded() {
    let store = MockVectorStore::new();
    let generator = MockGenerator::from_fn(|_| {
        Err(GenerationError::RequestFailed {
            model: "gemma3:1b".to_string(),
            message: "connection refused".to_string(),
        })
    });

    let report = summarizer(generator, &store)
        .summarize(&partition(vec![("Bio", vec!["Protein folding"])]))
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 0);
    assert!(matches!(
        report.outcomes()[0].1,
        Err(CategoryFailure::Generation(_))
    ));
    // the namespace is still recreated, just empty
    assert_eq!(store.point_count(SUMMARY_NAMESPACE), Some(0));
}

#[tokio::test]
async fn test_empty_categories_are_skipped() {
    let store = MockVectorStore::new();
    let partition = partition(vec![("Bio", vec!["Protein folding"]), ("Empty", vec![])]);

    let report = summarizer(MockGenerator::default(), &store)
        .summarize(&partition)
        .await
        .unwrap();

    assert_eq!(report.outcomes().len(), 1);
    assert_eq!(report.outcomes()[0].0, "Bio");
}

#[tokio::test]
async fn test_replaces_previous_summaries() {
    let store = MockVectorStore::new();
    let s = summarizer(MockGenerator::default(), &store);

    s.summarize(&partition(vec![("A", vec!["a"]), ("B", vec!["b"])]))
        .await
        .unwrap();
    s.summarize(&partition(vec![("C", vec!["c"])])).await.unwrap();

    let payloads = store.payloads(SUMMARY_NAMESPACE);
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["category"], "C");
}

#[tokio::test]
async fn test_store_failure_aborts() {
    let store = MockVectorStore::new();
    store.set_unavailable(true);

    let err = summarizer(MockGenerator::default(), &store)
        .summarize(&partition(vec![("Bio", vec!["Protein folding"])]))
        .await
        .unwrap_err();
    assert!(matches!(err, SummarizeError::Store(_)));
}

#[tokio::test]
async fn test_embedding_failure_is_recorded() {
    let store = MockVectorStore::new();
    let embedder = Arc::new(MockEmbedder::new(DIM));
    embedder.set_failing(true);

    let report = CategorySummarizer::new(
        embedder,
        Arc::new(MockGenerator::default()),
        Arc::new(NamespaceManager::new(store.clone())),
    )
    .summarize(&partition(vec![("Bio", vec!["Protein folding"])]))
    .await
    .unwrap();

    assert!(matches!(
        report.outcomes()[0].1,
        Err(CategoryFailure::Embedding(_))
    ));
}

struct SlowGenerator;

impl TextGenerator for SlowGenerator {
    async fn generate(&self, _prompt: &str, _structured: bool) -> Result<String, GenerationError> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(r#"{"summary":"late"}"#.to_string())
    }
}

#[tokio::test]
async fn test_generation_timeout_is_recorded() {
    let store = MockVectorStore::new();
    let timeouts = CallTimeouts {
        generate: Duration::from_millis(20),
        ..Default::default()
    };

    let report = summarizer(SlowGenerator, &store)
        .with_timeouts(timeouts)
        .with_concurrency(2)
        .summarize(&partition(vec![("A", vec!["a"]), ("B", vec!["b"])]))
        .await
        .unwrap();

    assert_eq!(report.failed(), 2);
    assert!(report.failures().all(|(_, e)| matches!(
        e,
        CategoryFailure::Generation(GenerationError::Timeout { timeout_ms: 20 })
    )));
}

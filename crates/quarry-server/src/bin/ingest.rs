//! Offline ingestion: cluster the corpus around its anchors, persist namespaces and
//! category summaries.
//!
//! Reads the same `QUARRY_*` environment as the server, plus `QUARRY_CORPUS_PATH`,
//! `QUARRY_ANCHORS_PATH` and `QUARRY_OUTPUT_PATH`.

use mimalloc::MiMalloc;

use quarry::config::Config;
use quarry::corpus::{load_anchors, load_corpus};
use quarry::lifecycle::Services;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate_ingest()?;

    let corpus = load_corpus(&config.corpus_path)?;
    let anchors = load_anchors(&config.anchors_path)?;
    tracing::info!(
        documents = corpus.len(),
        anchors = anchors.len(),
        top_m = config.top_m,
        corpus_limit = config.corpus_limit,
        "Loaded corpus"
    );

    let services = Services::initialize(&config).await?;
    let report = services.ingest_pipeline().run(&corpus, &anchors).await?;

    for ns in &report.namespaces {
        tracing::info!(
            category = %ns.category,
            namespace = %ns.namespace,
            points = ns.points,
            "Namespace written"
        );
    }
    for (category, failure) in report.summaries.failures() {
        tracing::warn!(category = %category, error = %failure, "No summary for category");
    }

    tracing::info!(
        selected = report.selected,
        assigned = report.partition.assigned_count(),
        summaries = report.summaries.succeeded(),
        failed = report.summaries.failed(),
        output = %config.output_path.display(),
        "Ingestion finished"
    );

    services.shutdown().await;
    Ok(())
}

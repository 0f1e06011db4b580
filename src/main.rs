//! Ingestion entry point: load the dataset, embed it, fill the collection,
//! and prove it answers queries before exiting.

use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use case_ingest::{HubDatasetSource, IngestConfig, LlmEmbedder, QdrantIndex, run_ingestion};
use llm_service::LlmConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Environment may come from a .env file or from the shell.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = IngestConfig::from_env()?;

    let index = QdrantIndex::connect(&cfg)?;
    let source = HubDatasetSource::new(&cfg.dataset)?;
    let embedder = LlmEmbedder::new(
        LlmConfig::new(&cfg.embedding_model, &cfg.embedding_url)
            .with_api_key(cfg.embedding_api_key.clone()),
        cfg.vector_size as usize,
    )?;

    let report = run_ingestion(&cfg, &source, &embedder, &index).await?;

    info!(
        indexed = report.indexed,
        batches = report.batches,
        score = report.probe.score,
        duration_ms = report.duration_ms,
        "collection ready and queryable"
    );

    Ok(())
}

//! Dataset → vector-store ingestion with readiness gating and a
//! post-upload verification probe.
//!
//! Public API:
//! - [`run_ingestion`]: provision a fresh collection, build points with
//!   dense ids, upload in parallel batches, wait until the store reports
//!   everything indexed, then prove the collection answers a known query.
//! - The stage modules it composes, each usable on its own.
//!
//! Every stage is a hard barrier: the next one does not start until the
//! previous fully completed.

pub mod config;
pub mod dataset;
pub mod embed;
pub mod errors;
pub mod points;
pub mod probe;
pub mod qdrant;
pub mod readiness;
pub mod record;
pub mod store;
pub mod upload;

use std::time::Instant;

use tracing::info;

pub use config::{DistanceKind, IngestConfig, vector_field_name};
pub use dataset::{HubDatasetSource, RecordSource};
pub use embed::{EmbeddingsProvider, LlmEmbedder};
pub use errors::IngestError;
pub use probe::ProbeResult;
pub use qdrant::QdrantIndex;
pub use record::Record;
pub use store::{IndexHealth, PointKey, SearchHit, StoredPoint, VectorIndex, VectorSpec};

/// Summary of one full ingestion run.
#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    /// Points written to the store.
    pub indexed: usize,
    /// Upload batches issued.
    pub batches: usize,
    /// Status polls until the collection reported ready.
    pub polls: u32,
    /// Wall-clock duration of the whole run.
    pub duration_ms: u128,
    /// Outcome of the verification probe.
    pub probe: ProbeResult,
}

/// Run the full pipeline: provision → build → upload → await ready → probe.
///
/// The collection named in `cfg` is destroyed and recreated; any prior
/// content is gone after this call. On error the collection may be absent,
/// empty, or partially filled; rerun from provisioning.
pub async fn run_ingestion(
    cfg: &IngestConfig,
    source: &dyn RecordSource,
    embedder: &dyn EmbeddingsProvider,
    index: &dyn VectorIndex,
) -> Result<IngestReport, IngestError> {
    info!(
        collection = %cfg.collection,
        dataset = %cfg.dataset,
        model = %cfg.embedding_model,
        "ingestion: start"
    );
    let started = Instant::now();

    let spec = VectorSpec {
        vector_name: cfg.vector_name(),
        size: cfg.vector_size,
        distance: cfg.distance,
    };
    store::provision(index, &spec).await?;

    let records = source.fetch().await?;
    if records.is_empty() {
        return Err(IngestError::Dataset("dataset yielded no records".into()));
    }

    let pts = points::build_points(&records)?;
    let batches = pts.len().div_ceil(cfg.batch_size.max(1));

    let indexed =
        upload::upload_points(index, embedder, pts, cfg.batch_size, cfg.upload_parallel).await?;

    let polls = readiness::await_ready(index, cfg.ready_poll, cfg.ready_timeout).await?;

    let probe = probe::verify(index, embedder, &records[0], 0).await?;

    let report = IngestReport {
        indexed,
        batches,
        polls,
        duration_ms: started.elapsed().as_millis(),
        probe,
    };

    info!(
        indexed = report.indexed,
        batches = report.batches,
        polls = report.polls,
        duration_ms = report.duration_ms,
        score = report.probe.score,
        "ingestion: verified"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fakes::{FakeEmbedder, FakeIndex};
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticSource(Vec<Record>);

    #[async_trait]
    impl RecordSource for StaticSource {
        async fn fetch(&self) -> Result<Vec<Record>, IngestError> {
            Ok(self.0.clone())
        }
    }

    fn cfg() -> IngestConfig {
        IngestConfig::from_lookup(|k| {
            match k {
                "QDRANT_URL" => Some("http://localhost:6334"),
                "COLLECTION_NAME" => Some("bail_judgments"),
                "EMBEDDING_MODEL" => Some("org/test-model"),
                "VECTOR_SIZE" => Some("4"),
                "BATCH_SIZE" => Some("2"),
                "UPLOAD_PARALLEL" => Some("2"),
                "READY_POLL_MS" => Some("1"),
                _ => None,
            }
            .map(str::to_string)
        })
        .unwrap()
    }

    fn records() -> Vec<Record> {
        [
            json!({"case_title": "A", "summary": "x"}),
            json!({"case_title": "B"}),
            json!({"case_title": "C", "summary": "z"}),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect()
    }

    #[tokio::test]
    async fn full_run_provisions_uploads_waits_and_verifies() {
        let index = FakeIndex::ready_after(2);
        *index.hits.lock().unwrap() = vec![SearchHit {
            id: PointKey::Num(0),
            score: 0.99,
            document: Some("A: x".into()),
        }];

        let report = run_ingestion(&cfg(), &StaticSource(records()), &FakeEmbedder, &index)
            .await
            .unwrap();

        assert_eq!(report.indexed, 3);
        assert_eq!(report.batches, 2);
        assert!(report.probe.matched);
        assert_eq!(
            index.spec.lock().unwrap().as_ref().unwrap().vector_name,
            "fast-test-model"
        );
    }

    #[tokio::test]
    async fn empty_dataset_aborts_before_upload() {
        let index = FakeIndex::default();
        let err = run_ingestion(&cfg(), &StaticSource(Vec::new()), &FakeEmbedder, &index)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Dataset(_)));
        assert!(index.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_record_aborts_before_upload() {
        let index = FakeIndex::default();
        let source = StaticSource(vec![
            serde_json::from_value(json!({"case_title": "A"})).unwrap(),
            serde_json::from_value(json!({"year": 2015})).unwrap(),
        ]);

        let err = run_ingestion(&cfg(), &source, &FakeEmbedder, &index)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MalformedRecord { index: 1, .. }));
        assert!(index.batches.lock().unwrap().is_empty());
    }
}

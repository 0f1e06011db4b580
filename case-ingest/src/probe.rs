//! Post-upload correctness probe.
//!
//! Reconstructs the similarity query for one known record, through the
//! same text derivation and the same embedding provider as ingestion, and
//! asserts that the store returns that record as the top result. A failure
//! here signals ingestion or indexing corruption, not a transient fault,
//! and is never retried.

use tracing::info;

use crate::embed::EmbeddingsProvider;
use crate::errors::IngestError;
use crate::record::{Record, TITLE_FIELD, document_text};
use crate::store::{PointKey, VectorIndex};

/// Outcome of a successful verification query.
#[derive(Debug, Clone, Copy)]
pub struct ProbeResult {
    pub matched: bool,
    pub score: f32,
    pub returned_id: u64,
}

/// Issue a top-1 similarity query for `sample` and assert the expected id.
///
/// # Errors
/// - `IngestError::Verification` if the query returns nothing, or the top
///   result's id diverges from `expected_id`
pub async fn verify(
    index: &dyn VectorIndex,
    embedder: &dyn EmbeddingsProvider,
    sample: &Record,
    expected_id: u64,
) -> Result<ProbeResult, IngestError> {
    let text = document_text(sample).ok_or_else(|| IngestError::MalformedRecord {
        index: expected_id as usize,
        reason: format!("missing or non-string `{TITLE_FIELD}` field"),
    })?;

    let vector = embedder.embed(&text).await?;
    let hits = index.search(vector, 1).await?;

    let top = hits
        .into_iter()
        .next()
        .ok_or_else(|| IngestError::Verification("similarity query returned no results".into()))?;

    let returned_id = match top.id {
        PointKey::Num(n) => n,
        PointKey::Uuid(u) => {
            return Err(IngestError::Verification(format!(
                "top hit has non-numeric id '{u}'"
            )));
        }
    };

    if returned_id != expected_id {
        return Err(IngestError::Verification(format!(
            "top hit id {returned_id} != expected {expected_id} (score {:.4})",
            top.score
        )));
    }

    info!(
        score = top.score,
        returned_id,
        preview = %preview(top.document.as_deref().unwrap_or_default()),
        "probe matched"
    );

    Ok(ProbeResult {
        matched: true,
        score: top.score,
        returned_id,
    })
}

/// First 100 characters of the returned document, for logging.
fn preview(s: &str) -> String {
    s.chars().take(100).collect()
}

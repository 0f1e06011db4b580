//! Point assembly: stable identity plus payload for each record.

use serde_json::{Value, json};

use crate::errors::IngestError;
use crate::record::{Record, TITLE_FIELD, document_text};

/// One unit of storage before embedding resolution: the dense id, the text
/// to embed, and the payload stored alongside the vector.
#[derive(Debug, Clone)]
pub struct Point {
    /// Ordinal position of the record in the dataset.
    pub id: u64,
    /// Canonical document text; embedded at upload time.
    pub text: String,
    /// Payload: rendered document plus the full original record.
    pub payload: Value,
}

/// Build one point from the record at `index`.
///
/// Pure transform: no network, no embedding. Embedding resolution is
/// deferred to the uploader so a malformed record aborts the run before
/// any upload call is made.
pub fn build_point(index: usize, record: &Record) -> Result<Point, IngestError> {
    let text = document_text(record).ok_or_else(|| IngestError::MalformedRecord {
        index,
        reason: format!("missing or non-string `{TITLE_FIELD}` field"),
    })?;

    let payload = json!({
        "document": text,
        "metadata": Value::Object(record.0.clone()),
    });

    Ok(Point {
        id: index as u64,
        text,
        payload,
    })
}

/// Build points for the whole dataset, ids dense over `0..records.len()`.
pub fn build_points(records: &[Record]) -> Result<Vec<Point>, IngestError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| build_point(index, record))
        .collect()
}

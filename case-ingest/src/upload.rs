//! Batched parallel upload of points into the store.
//!
//! Points are partitioned into ordered chunks of at most `batch_size`;
//! chunks are submitted in partition order with up to `max_parallel` in
//! flight at once. Completion order across workers is unconstrained:
//! workers operate on disjoint id ranges, so no client-side locking is
//! needed. A failed chunk fails the whole run; there is no retry.

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::embed::EmbeddingsProvider;
use crate::errors::IngestError;
use crate::points::Point;
use crate::store::{PointKey, StoredPoint, VectorIndex};

/// Embed and transmit all points. Returns the number of points written.
///
/// Safe to call at most once per freshly provisioned collection: ids are
/// stable, so a re-run would overwrite-by-id rather than corrupt, but the
/// pipeline never relies on that.
pub async fn upload_points(
    index: &dyn VectorIndex,
    embedder: &dyn EmbeddingsProvider,
    points: Vec<Point>,
    batch_size: usize,
    max_parallel: usize,
) -> Result<usize, IngestError> {
    if points.is_empty() {
        debug!("no points to upload");
        return Ok(0);
    }

    let batch_size = batch_size.max(1);
    let chunks: Vec<Vec<Point>> = points.chunks(batch_size).map(<[Point]>::to_vec).collect();

    info!(
        points = chunks.iter().map(Vec::len).sum::<usize>(),
        batches = chunks.len(),
        batch_size,
        max_parallel,
        "upload: start"
    );

    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-"),
    );

    let written: usize = stream::iter(chunks.into_iter().enumerate())
        .map(|(batch_no, chunk)| {
            let pb = pb.clone();
            async move {
                let texts: Vec<String> = chunk.iter().map(|p| p.text.clone()).collect();
                let vectors = embedder.embed_batch(&texts).await?;
                if vectors.len() != chunk.len() {
                    return Err(IngestError::Embedding(format!(
                        "batch {batch_no}: {} vectors for {} texts",
                        vectors.len(),
                        chunk.len()
                    )));
                }

                let stored: Vec<StoredPoint> = chunk
                    .into_iter()
                    .zip(vectors)
                    .map(|(p, vector)| StoredPoint {
                        id: PointKey::Num(p.id),
                        vector,
                        payload: p.payload,
                    })
                    .collect();

                let n = index.upsert(stored).await?;
                pb.inc(1);
                debug!(batch = batch_no, written = n, "batch uploaded");
                Ok::<usize, IngestError>(n)
            }
        })
        .buffer_unordered(max_parallel.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .sum::<Result<usize, IngestError>>()?;

    pb.finish_and_clear();
    info!(written, "upload: finished");
    Ok(written)
}

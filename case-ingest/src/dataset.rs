//! Dataset acquisition from the Hugging Face datasets-server.
//!
//! Yields the `train` split as a fixed-order, fixed-length sequence of
//! records by paging the `/rows` REST endpoint. Record order and length are
//! what give point ids their meaning, so rows are collected strictly in
//! server order.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::IngestError;
use crate::record::Record;

const DATASETS_SERVER_URL: &str = "https://datasets-server.huggingface.co";
const PAGE_SIZE: usize = 100;

/// Source of the ordered record sequence to ingest.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch all records, in their stable dataset order.
    async fn fetch(&self) -> Result<Vec<Record>, IngestError>;
}

/// Record source backed by the Hugging Face datasets-server `/rows` API.
pub struct HubDatasetSource {
    client: reqwest::Client,
    base_url: String,
    dataset: String,
}

impl HubDatasetSource {
    /// # Errors
    /// Returns `IngestError::Dataset` if the HTTP client cannot be built.
    pub fn new(dataset: impl Into<String>) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| IngestError::Dataset(format!("http client build: {e}")))?;

        Ok(Self {
            client,
            base_url: DATASETS_SERVER_URL.into(),
            dataset: dataset.into(),
        })
    }

    async fn fetch_page(&self, offset: usize) -> Result<RowsPage, IngestError> {
        let url = format!("{}/rows", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("dataset", self.dataset.as_str()),
                ("config", "default"),
                ("split", "train"),
                ("offset", &offset.to_string()),
                ("length", &PAGE_SIZE.to_string()),
            ])
            .send()
            .await
            .map_err(|e| IngestError::Dataset(format!("GET {url}: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(IngestError::Dataset(format!(
                "datasets-server returned {status} for '{}' at offset {offset}: {body}",
                self.dataset
            )));
        }

        resp.json::<RowsPage>()
            .await
            .map_err(|e| IngestError::Dataset(format!("parse rows page: {e}")))
    }
}

#[async_trait]
impl RecordSource for HubDatasetSource {
    async fn fetch(&self) -> Result<Vec<Record>, IngestError> {
        info!(dataset = %self.dataset, "fetching dataset rows");

        let first = self.fetch_page(0).await?;
        let total = first.num_rows_total as usize;
        let mut records: Vec<Record> = Vec::with_capacity(total);
        records.extend(first.rows.into_iter().map(|r| Record(r.row)));

        while records.len() < total {
            let page = self.fetch_page(records.len()).await?;
            if page.rows.is_empty() {
                return Err(IngestError::Dataset(format!(
                    "datasets-server returned {} of {total} announced rows for '{}'",
                    records.len(),
                    self.dataset
                )));
            }
            records.extend(page.rows.into_iter().map(|r| Record(r.row)));
            debug!(fetched = records.len(), total, "dataset page fetched");
        }

        info!(rows = records.len(), dataset = %self.dataset, "dataset fetched");
        Ok(records)
    }
}

/// One page of the `/rows` response.
#[derive(Debug, Deserialize)]
struct RowsPage {
    rows: Vec<RowEnvelope>,
    num_rows_total: u64,
}

#[derive(Debug, Deserialize)]
struct RowEnvelope {
    row: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::document_text;
    use serde_json::json;

    #[test]
    fn rows_page_decodes_server_shape() {
        let raw = json!({
            "features": [{"name": "case_title", "type": {"dtype": "string"}}],
            "rows": [
                { "row_idx": 0, "row": {"case_title": "State v. A", "summary": "x"}, "truncated_cells": [] },
                { "row_idx": 1, "row": {"case_title": "State v. B"}, "truncated_cells": [] }
            ],
            "num_rows_total": 2,
            "num_rows_per_page": 100,
            "partial": false
        });

        let page: RowsPage = serde_json::from_value(raw).unwrap();
        assert_eq!(page.num_rows_total, 2);
        let records: Vec<Record> = page.rows.into_iter().map(|r| Record(r.row)).collect();
        assert_eq!(document_text(&records[0]).unwrap(), "State v. A: x");
        assert_eq!(document_text(&records[1]).unwrap(), "State v. B: ");
    }
}

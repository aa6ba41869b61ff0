use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::constants::{PERSIST_CHUNK_SIZE, PERSIST_MAX_ATTEMPTS, PERSIST_RETRY_DELAY_SECS};
use crate::error::{Result, ScraperError};
use crate::observability::metrics;

/// One ranged write in a batch update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchUpdateOp {
    pub range: String,
    pub values: Vec<Vec<String>>,
}

impl BatchUpdateOp {
    /// Single-cell write.
    pub fn cell(range: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            values: vec![vec![value.into()]],
        }
    }
}

/// Spreadsheet transport. The REST implementation talks to the Sheets v4
/// values endpoints; tests swap in mocks.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// One value grid per requested range, in request order.
    async fn batch_get(&self, ranges: &[String]) -> Result<Vec<Vec<Vec<String>>>>;

    /// Applies all ops in one call; returns the number of updated cells.
    async fn batch_update(&self, ops: &[BatchUpdateOp]) -> Result<usize>;
}

/// One sheet row merged across the requested columns, missing cells as "".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based row number on the sheet.
    pub row: u32,
    pub cells: Vec<String>,
}

impl SheetRow {
    pub fn cell(&self, idx: usize) -> &str {
        self.cells.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// Read/write gateway over the spreadsheet transport.
///
/// Writes are chunked and retried; reads merge per-column grids back into
/// rows carrying their sheet row numbers.
pub struct SheetsGateway {
    api: Arc<dyn SheetsApi>,
    retry_delay: Duration,
}

impl SheetsGateway {
    pub fn new(api: Arc<dyn SheetsApi>) -> Self {
        Self {
            api,
            retry_delay: Duration::from_secs(PERSIST_RETRY_DELAY_SECS),
        }
    }

    /// Override of the per-chunk retry delay, for tests that exercise the
    /// retry path without waiting out the production delay.
    pub fn with_retry_delay(api: Arc<dyn SheetsApi>, retry_delay: Duration) -> Self {
        Self { api, retry_delay }
    }

    /// Reads the given column ranges and zips them row-wise.
    ///
    /// Row numbers start from the first data row of the first range
    /// ("Labels!A2:A" yields rows numbered from 2). Columns shorter than
    /// the longest one are padded with empty cells.
    pub async fn read_columns(&self, ranges: &[String]) -> Result<Vec<SheetRow>> {
        let start_row = ranges
            .first()
            .and_then(|range| extract_start_row(range))
            .ok_or_else(|| {
                ScraperError::Config(format!("cannot parse start row from ranges {ranges:?}"))
            })?;

        let grids = self.api.batch_get(ranges).await?;

        let row_count = grids.iter().map(Vec::len).max().unwrap_or(0);
        let mut rows = Vec::with_capacity(row_count);
        for offset in 0..row_count {
            let cells = grids
                .iter()
                .map(|grid| {
                    grid.get(offset)
                        .and_then(|row| row.first())
                        .cloned()
                        .unwrap_or_default()
                })
                .collect();
            rows.push(SheetRow {
                row: start_row + offset as u32,
                cells,
            });
        }

        metrics::sheets::rows_read(rows.len());
        Ok(rows)
    }

    /// Applies `ops` in chunks of at most `chunk_size`, retrying each chunk
    /// up to the attempt limit with a fixed delay. The first chunk that
    /// exhausts its attempts fails the whole batch; later chunks are not
    /// attempted. Returns the total number of cells updated.
    pub async fn batch_update_in_chunks(
        &self,
        ops: &[BatchUpdateOp],
        chunk_size: usize,
    ) -> Result<usize> {
        let mut total_cells = 0usize;
        let chunk_count = ops.len().div_ceil(chunk_size);

        for (index, chunk) in ops.chunks(chunk_size).enumerate() {
            let mut last_error = None;

            for attempt in 1..=PERSIST_MAX_ATTEMPTS {
                match self.api.batch_update(chunk).await {
                    Ok(cells) => {
                        metrics::sheets::chunk_success();
                        metrics::sheets::cells_updated(cells);
                        info!(
                            chunk = index + 1,
                            of = chunk_count,
                            ops = chunk.len(),
                            cells,
                            "chunk persisted"
                        );
                        total_cells += cells;
                        last_error = None;
                        break;
                    }
                    Err(err) => {
                        metrics::sheets::chunk_retry();
                        warn!(
                            chunk = index + 1,
                            attempt,
                            error = %err,
                            "chunk update failed"
                        );
                        last_error = Some(err);
                        if attempt < PERSIST_MAX_ATTEMPTS {
                            tokio::time::sleep(self.retry_delay).await;
                        }
                    }
                }
            }

            if let Some(err) = last_error {
                metrics::sheets::chunk_failure();
                return Err(ScraperError::Persistence(format!(
                    "chunk {}/{chunk_count} failed after {PERSIST_MAX_ATTEMPTS} attempts: {err}",
                    index + 1
                )));
            }
        }

        Ok(total_cells)
    }

    /// Convenience wrapper using the default chunk size.
    pub async fn persist(&self, ops: &[BatchUpdateOp]) -> Result<usize> {
        self.batch_update_in_chunks(ops, PERSIST_CHUNK_SIZE).await
    }
}

/// Trailing digits of the start cell in a range like "Labels!A2:A".
fn extract_start_row(range: &str) -> Option<u32> {
    let start_cell = range.split('!').nth(1)?.split(':').next()?;
    let digits: String = start_cell.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Sheets v4 REST transport using a bearer token issued out of band.
pub struct RestSheetsApi {
    client: reqwest::Client,
    spreadsheet_id: String,
    token: String,
}

impl RestSheetsApi {
    pub fn new(spreadsheet_id: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            spreadsheet_id,
            token,
        }
    }

    fn values_url(&self, suffix: &str) -> String {
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values{suffix}",
            self.spreadsheet_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct BatchGetResponse {
    #[serde(rename = "valueRanges", default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct BatchUpdateResponse {
    #[serde(rename = "totalUpdatedCells", default)]
    total_updated_cells: usize,
}

fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetsApi for RestSheetsApi {
    async fn batch_get(&self, ranges: &[String]) -> Result<Vec<Vec<Vec<String>>>> {
        let query: Vec<(&str, &str)> = ranges
            .iter()
            .map(|range| ("ranges", range.as_str()))
            .collect();

        let response = self
            .client
            .get(self.values_url(":batchGet"))
            .query(&query)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScraperError::Api {
                message: format!("batchGet returned {}", response.status()),
            });
        }

        let body: BatchGetResponse = response.json().await?;
        Ok(body
            .value_ranges
            .into_iter()
            .map(|range| {
                range
                    .values
                    .iter()
                    .map(|row| row.iter().map(cell_to_string).collect())
                    .collect()
            })
            .collect())
    }

    async fn batch_update(&self, ops: &[BatchUpdateOp]) -> Result<usize> {
        let payload = json!({
            "valueInputOption": "USER_ENTERED",
            "data": ops,
        });

        let response = self
            .client
            .post(self.values_url(":batchUpdate"))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScraperError::Api {
                message: format!("batchUpdate returned {}", response.status()),
            });
        }

        let body: BatchUpdateResponse = response.json().await?;
        Ok(body.total_updated_cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    /// Records each batch_update call; fails calls whose (1-based) index
    /// is in `fail_calls`.
    struct RecordingApi {
        calls: Mutex<Vec<usize>>,
        fail_calls: Vec<usize>,
    }

    impl RecordingApi {
        fn new(fail_calls: Vec<usize>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_calls,
            }
        }
    }

    #[async_trait]
    impl SheetsApi for RecordingApi {
        async fn batch_get(&self, _ranges: &[String]) -> Result<Vec<Vec<Vec<String>>>> {
            Ok(Vec::new())
        }

        async fn batch_update(&self, ops: &[BatchUpdateOp]) -> Result<usize> {
            let mut calls = self.calls.lock().await;
            calls.push(ops.len());
            if self.fail_calls.contains(&calls.len()) {
                return Err(ScraperError::Api {
                    message: "simulated failure".to_string(),
                });
            }
            Ok(ops.len())
        }
    }

    fn ops(count: usize) -> Vec<BatchUpdateOp> {
        (0..count)
            .map(|i| BatchUpdateOp::cell(format!("Labels!A{}", i + 2), "x"))
            .collect()
    }

    fn gateway(api: Arc<RecordingApi>) -> SheetsGateway {
        SheetsGateway::with_retry_delay(api, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn splits_large_batches_into_chunks() {
        let api = Arc::new(RecordingApi::new(vec![]));
        let cells = gateway(api.clone())
            .batch_update_in_chunks(&ops(1200), 500)
            .await
            .unwrap();

        let calls = api.calls.lock().await;
        assert_eq!(*calls, vec![500, 500, 200]);
        assert_eq!(cells, 1200);
    }

    #[tokio::test]
    async fn transient_chunk_failure_is_retried() {
        // First call fails, retry of the same chunk succeeds.
        let api = Arc::new(RecordingApi::new(vec![1]));
        let cells = gateway(api.clone())
            .batch_update_in_chunks(&ops(600), 500)
            .await
            .unwrap();

        let calls = api.calls.lock().await;
        assert_eq!(*calls, vec![500, 500, 100]);
        assert_eq!(cells, 600);
    }

    #[tokio::test]
    async fn exhausted_chunk_stops_the_batch() {
        // Chunk 1 succeeds (call 1); chunk 2 fails on calls 2..=4 and
        // exhausts its attempts; chunk 3 must never be attempted.
        let api = Arc::new(RecordingApi::new(vec![2, 3, 4]));
        let result = gateway(api.clone())
            .batch_update_in_chunks(&ops(1200), 500)
            .await;

        assert!(matches!(result, Err(ScraperError::Persistence(_))));
        let calls = api.calls.lock().await;
        assert_eq!(calls.len(), 4);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let api = Arc::new(RecordingApi::new(vec![]));
        let cells = gateway(api.clone())
            .batch_update_in_chunks(&[], 500)
            .await
            .unwrap();
        assert_eq!(cells, 0);
        assert!(api.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn read_columns_merges_ragged_grids() {
        struct FixedApi;

        #[async_trait]
        impl SheetsApi for FixedApi {
            async fn batch_get(&self, _ranges: &[String]) -> Result<Vec<Vec<Vec<String>>>> {
                Ok(vec![
                    vec![
                        vec!["Drumcode".to_string()],
                        vec!["Afterlife".to_string()],
                        vec!["Kompakt".to_string()],
                    ],
                    vec![vec!["Oui".to_string()]],
                ])
            }

            async fn batch_update(&self, _ops: &[BatchUpdateOp]) -> Result<usize> {
                Ok(0)
            }
        }

        let gateway = SheetsGateway::new(Arc::new(FixedApi));
        let rows = gateway
            .read_columns(&["Labels!A2:A".to_string(), "Labels!U2:U".to_string()])
            .await
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].row, 2);
        assert_eq!(rows[0].cell(0), "Drumcode");
        assert_eq!(rows[0].cell(1), "Oui");
        assert_eq!(rows[2].row, 4);
        assert_eq!(rows[2].cell(1), "");
    }

    #[test]
    fn start_row_parses_from_range() {
        assert_eq!(extract_start_row("Labels!A2:A"), Some(2));
        assert_eq!(extract_start_row("Labels!T10:T"), Some(10));
        assert_eq!(extract_start_row("Labels!A:A"), None);
    }
}

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::app::ports::ChartSitePort;
use crate::constants::{LABELS_SHEET, OUI};
use crate::error::Result;
use crate::infra::sheets::SheetsGateway;
use crate::observability::metrics;
use crate::pipeline::batch;
use crate::pipeline::orchestrator::{FailureRecord, WorkerPool};
use crate::pipeline::reconcile::{Reconciler, SheetLabel};
use crate::types::{ChartEntry, ChartGenre};

/// Entries scraped for one genre list, reconciled as a unit.
#[derive(Debug, Clone)]
pub struct GenreBatch {
    pub genre: ChartGenre,
    pub entries: Vec<ChartEntry>,
}

/// Outcome of a top-100 run.
#[derive(Debug)]
pub struct TopRunSummary {
    pub genres_fetched: usize,
    pub failures: Vec<FailureRecord>,
    pub update_ops: usize,
}

/// Scrapes every genre's top-100 concurrently, then reconciles the batches
/// against the sheet one at a time so the row counter stays consistent.
pub struct TopUseCase {
    gateway: Arc<SheetsGateway>,
    chart: Arc<dyn ChartSitePort>,
    pool: WorkerPool,
}

impl TopUseCase {
    pub fn new(gateway: Arc<SheetsGateway>, chart: Arc<dyn ChartSitePort>, pool: WorkerPool) -> Self {
        Self {
            gateway,
            chart,
            pool,
        }
    }

    pub async fn run(&self) -> Result<TopRunSummary> {
        let batches: Arc<Mutex<Vec<GenreBatch>>> = Arc::new(Mutex::new(Vec::new()));
        let failures: Arc<Mutex<Vec<FailureRecord>>> = Arc::new(Mutex::new(Vec::new()));

        let chart = self.chart.clone();
        let batches_ref = batches.clone();
        let failures_ref = failures.clone();
        self.pool
            .run_units(ChartGenre::all().to_vec(), move |genre: ChartGenre| {
                let chart = chart.clone();
                let batches = batches_ref.clone();
                let failures = failures_ref.clone();
                async move {
                    match chart.top_100(genre).await {
                        Ok(entries) => {
                            metrics::charts::fetch_success();
                            metrics::charts::entries_scraped(entries.len());
                            info!(?genre, count = entries.len(), "genre chart scraped");
                            batches.lock().await.push(GenreBatch { genre, entries });
                        }
                        Err(err) => {
                            metrics::charts::fetch_error();
                            error!(?genre, error = %err, "genre chart fetch failed");
                            failures.lock().await.push(FailureRecord {
                                name: format!("{genre:?}"),
                                reason: err.to_string(),
                            });
                        }
                    }
                }
            })
            .await;

        let batches = Arc::try_unwrap(batches)
            .map(Mutex::into_inner)
            .unwrap_or_default();
        let failures = Arc::try_unwrap(failures)
            .map(Mutex::into_inner)
            .unwrap_or_default();
        let genres_fetched = batches.len();

        // Each batch is reconciled against a fresh snapshot so earlier
        // appends are visible to later batches.
        let mut update_ops = 0usize;
        for batch_of_genre in batches {
            let snapshot = self.read_snapshot().await?;
            let mut reconciler = Reconciler::new(snapshot.len());
            let reconciled = reconciler.reconcile(&snapshot, &batch_of_genre.entries);
            let ops = batch::beatstats_updates(&reconciled);
            if ops.is_empty() {
                continue;
            }
            // A persistence failure here is fatal; a half-applied chart
            // batch cannot be resumed safely.
            let cells = self.gateway.persist(&ops).await?;
            info!(
                genre = ?batch_of_genre.genre,
                ops = ops.len(),
                cells,
                "genre batch persisted"
            );
            update_ops += ops.len();
        }

        Ok(TopRunSummary {
            genres_fetched,
            failures,
            update_ops,
        })
    }

    /// Columns A (name), C (genre), T (rank), R (marketplace link) and
    /// V (processed flag) for every data row.
    async fn read_snapshot(&self) -> Result<Vec<SheetLabel>> {
        let ranges: Vec<String> = ['A', 'C', 'T', 'R', 'V']
            .iter()
            .map(|c| format!("{LABELS_SHEET}!{c}2:{c}"))
            .collect();
        let rows = self.gateway.read_columns(&ranges).await?;
        Ok(rows
            .into_iter()
            .map(|r| SheetLabel {
                row: r.row,
                name: r.cell(0).to_string(),
                genre: r.cell(1).to_string(),
                position: r.cell(2).to_string(),
                beatport_link: match r.cell(3) {
                    "" => None,
                    link => Some(link.to_string()),
                },
                flagged: r.cell(4) == OUI,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScraperError;
    use crate::infra::sheets::{BatchUpdateOp, SheetsApi};
    use async_trait::async_trait;
    use std::time::Duration;

    struct StubSheets {
        grids: Vec<Vec<Vec<String>>>,
        recorded: Mutex<Vec<BatchUpdateOp>>,
    }

    #[async_trait]
    impl SheetsApi for StubSheets {
        async fn batch_get(&self, _ranges: &[String]) -> crate::error::Result<Vec<Vec<Vec<String>>>> {
            Ok(self.grids.clone())
        }

        async fn batch_update(&self, ops: &[BatchUpdateOp]) -> crate::error::Result<usize> {
            self.recorded.lock().await.extend(ops.iter().cloned());
            Ok(ops.len())
        }
    }

    struct OneGenreChart;

    #[async_trait]
    impl ChartSitePort for OneGenreChart {
        async fn top_100(&self, genre: ChartGenre) -> crate::error::Result<Vec<ChartEntry>> {
            if genre != ChartGenre::TechnoPeakTime {
                return Err(ScraperError::Api {
                    message: "list unavailable".to_string(),
                });
            }
            Ok(vec![ChartEntry {
                name: "Drumcode".to_string(),
                genre: genre.display_name().to_string(),
                beatport_link: None,
                position: "3".to_string(),
                is_hype: false,
            }])
        }
    }

    #[tokio::test]
    async fn failed_genres_are_reported_but_do_not_stop_the_run() {
        let sheets = Arc::new(StubSheets {
            grids: vec![
                vec![vec!["Drumcode".to_string()]],
                vec![vec!["Techno".to_string()]],
                vec![vec![String::new()]],
                vec![vec![String::new()]],
                vec![vec![String::new()]],
            ],
            recorded: Mutex::new(Vec::new()),
        });
        let gateway = Arc::new(SheetsGateway::with_retry_delay(
            sheets.clone(),
            Duration::from_millis(1),
        ));
        let use_case = TopUseCase::new(gateway, Arc::new(OneGenreChart), WorkerPool::new(5));

        let summary = use_case.run().await.unwrap();

        assert_eq!(summary.genres_fetched, 1);
        assert_eq!(summary.failures.len(), 7);

        let ops = sheets.recorded.lock().await;
        assert!(ops
            .iter()
            .any(|op| op.range == "Labels!T2" && op.values == vec![vec!["3".to_string()]]));
        assert!(ops
            .iter()
            .any(|op| op.range == "Labels!V2" && op.values == vec![vec!["Oui".to_string()]]));
        // Existing row matched by name, so no append below the snapshot.
        assert!(!ops.iter().any(|op| op.range == "Labels!A3"));
    }
}

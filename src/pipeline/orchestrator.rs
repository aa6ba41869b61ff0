use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::warn;

use crate::observability::metrics;
use crate::types::{LabelRecord, ProcessingOutcome};

/// One unit of work that ended in failure, with the reason kept for the
/// run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Default)]
struct CollectorState {
    successes: Vec<LabelRecord>,
    failures: Vec<FailureRecord>,
    partials: HashMap<u32, LabelRecord>,
}

/// Shared outcome collections for a concurrent batch.
///
/// All three collections live behind one lock so a unit's partial update
/// and its promotion can never interleave with another unit's view of the
/// same row. Promotion moves a partial into the successes exactly once;
/// promoting an absent row is a no-op.
#[derive(Clone, Default)]
pub struct OutcomeCollector {
    state: Arc<Mutex<CollectorState>>,
}

impl OutcomeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, outcome: ProcessingOutcome) {
        match outcome {
            ProcessingOutcome::Success { label } => {
                metrics::labels::unit_success();
                self.state.lock().await.successes.push(label);
            }
            ProcessingOutcome::Failure { name, reason } => {
                self.record_failure(name, reason).await;
            }
        }
    }

    pub async fn record_failure(&self, name: String, reason: String) {
        metrics::labels::unit_failure();
        self.state
            .lock()
            .await
            .failures
            .push(FailureRecord { name, reason });
    }

    /// Merges a partial update into the pending record for `row`.
    pub async fn record_partial(&self, row: u32, partial: LabelRecord) {
        let mut state = self.state.lock().await;
        let pending = state.partials.entry(row).or_insert_with(|| LabelRecord {
            row: Some(row),
            ..Default::default()
        });
        pending.merge(partial);
    }

    /// Moves the pending record for `row` into the successes. Safe to call
    /// more than once; only the first call has an effect.
    pub async fn promote(&self, row: u32) {
        let mut state = self.state.lock().await;
        if let Some(label) = state.partials.remove(&row) {
            metrics::labels::unit_success();
            state.successes.push(label);
        }
    }

    /// Drains the collections. Un-promoted partials are dropped.
    pub async fn finish(&self) -> (Vec<LabelRecord>, Vec<FailureRecord>) {
        let mut state = self.state.lock().await;
        (
            std::mem::take(&mut state.successes),
            std::mem::take(&mut state.failures),
        )
    }
}

/// Fixed-width concurrent worker pool over a batch of independent units.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    width: usize,
}

impl WorkerPool {
    pub fn new(width: usize) -> Self {
        Self { width: width.max(1) }
    }

    /// Runs `work` over every unit, at most `width` at a time, and waits
    /// for all of them. Panicked or cancelled tasks are logged and do not
    /// abort the batch.
    pub async fn run_units<T, F, Fut>(&self, units: Vec<T>, work: F)
    where
        T: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.width));
        let mut tasks = JoinSet::new();

        for unit in units {
            let semaphore = semaphore.clone();
            let work = work.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore closed");
                work(unit).await;
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "worker task aborted");
            }
        }
    }

    /// Like [`run_units`], but routes each unit's error into the
    /// collector's failures under the unit's display name.
    ///
    /// [`run_units`]: WorkerPool::run_units
    pub async fn run_collected<T, F, Fut>(
        &self,
        units: Vec<T>,
        collector: OutcomeCollector,
        name_of: impl Fn(&T) -> String,
        work: F,
    ) where
        T: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        metrics::labels::batch_size(units.len());
        let named: Vec<(String, T)> = units
            .into_iter()
            .map(|unit| (name_of(&unit), unit))
            .collect();

        self.run_units(named, move |(name, unit)| {
            let collector = collector.clone();
            let work = work.clone();
            async move {
                if let Err(err) = work(unit).await {
                    collector.record_failure(name, err.to_string()).await;
                }
            }
        })
        .await;
    }
}

use crate::api::ScanExecutor;
use crate::constants::ENV_FORCE_REINDEX;
use crate::grid::GridCatalog;
use crate::index::LineOffsetIndex;
use crate::partition::{partition, LineRange};
use crate::rank::{rank, RankedReport};
use crate::reduce::reduce;
use crate::scan::{scan_range, ScanOutcome};
use crate::stats::{IndexStats, JobStats, ReduceStats, ScanStats};
use crate::tally::WorkerState;
use crate::utils::{default_worker_count, env_var_truthy};
use anyhow::{Context, Result};
use crossbeam_channel as channel;
use std::path::Path;
use std::thread;
use std::time::Instant;
use tracing::info;

/// Scan executor backed by a fixed pool of dedicated threads, one per
/// assigned range. Workers share no mutable state; each opens its own
/// file handle and delivers its outcome over a bounded channel. The join
/// before returning is the job's single synchronization point.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadExecutor;

impl ScanExecutor for ThreadExecutor {
    fn execute(
        &self,
        path: &Path,
        catalog: &GridCatalog,
        assignments: &[LineRange],
    ) -> Result<Vec<ScanOutcome>> {
        thread::scope(|scope| {
            let (tx, rx) = channel::bounded::<(usize, Result<ScanOutcome>)>(assignments.len());
            for (worker, range) in assignments.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move || {
                    let outcome = scan_range(path, *range, catalog);
                    let _ = tx.send((worker, outcome));
                });
            }
            drop(tx);

            let mut outcomes: Vec<Option<ScanOutcome>> = Vec::new();
            outcomes.resize_with(assignments.len(), || None);
            for (worker, outcome) in rx {
                let outcome =
                    outcome.with_context(|| format!("scan worker {} failed", worker))?;
                outcomes[worker] = Some(outcome);
            }
            outcomes
                .into_iter()
                .enumerate()
                .map(|(worker, o)| {
                    o.with_context(|| format!("scan worker {} never reported", worker))
                })
                .collect()
        })
    }
}

/// A finished run: the ranked report plus per-phase accounting.
#[derive(Debug)]
pub struct JobOutcome {
    pub report: RankedReport,
    pub stats: JobStats,
}

/// Coordinator-side configuration and orchestration.
///
/// The coordinator builds or loads the offset index, partitions it, fans
/// the ranges out through a [`ScanExecutor`], reduces the returned worker
/// states, and ranks the merged result. The index side file is written
/// exactly once, before any worker starts; workers only ever read the
/// data file.
#[derive(Clone, Debug)]
pub struct AggregationJob {
    pub workers: usize,
    pub force_reindex: bool,
}

impl Default for AggregationJob {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            force_reindex: env_var_truthy(ENV_FORCE_REINDEX),
        }
    }
}

impl AggregationJob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_force_reindex(mut self, force: bool) -> Self {
        self.force_reindex = force;
        self
    }

    /// Run the whole job with the in-process thread executor.
    pub fn run(&self, data_path: &Path, catalog: &GridCatalog) -> Result<JobOutcome> {
        self.run_with(&ThreadExecutor, data_path, catalog)
    }

    /// Run with an explicit executor. Ranges are assigned once, up front,
    /// and never rebalanced; a straggler stalls the batch, which is
    /// acceptable because ranges are length-balanced.
    pub fn run_with<E>(
        &self,
        executor: &E,
        data_path: &Path,
        catalog: &GridCatalog,
    ) -> Result<JobOutcome>
    where
        E: ScanExecutor + ?Sized,
    {
        let mut stats = JobStats::default();

        let index_start = Instant::now();
        let (index, rebuilt) = LineOffsetIndex::load_or_build(data_path, self.force_reindex)?;
        stats.index = IndexStats {
            lines: index.len(),
            rebuilt,
            wall_ms: index_start.elapsed().as_millis() as u64,
        };
        info!(
            phase = "index",
            lines = stats.index.lines,
            rebuilt = stats.index.rebuilt,
            wall_ms = stats.index.wall_ms,
            "Index phase complete"
        );

        let assignments = partition(&index, self.workers);

        let scan_start = Instant::now();
        let outcomes = executor.execute(data_path, catalog, &assignments)?;
        stats.scan =
            ScanStats::from_outcomes(&outcomes, scan_start.elapsed().as_millis() as u64);
        info!(
            phase = "scan",
            workers = stats.scan.workers,
            lines_read = stats.scan.lines_read,
            posts_usable = stats.scan.posts_usable,
            lines_skipped = stats.scan.lines_skipped,
            min_worker_ms = stats.scan.min_worker_ms,
            max_worker_ms = stats.scan.max_worker_ms,
            wall_ms = stats.scan.wall_ms,
            "Scan phase complete"
        );

        let reduce_start = Instant::now();
        let states: Vec<WorkerState> = outcomes.into_iter().map(|o| o.state).collect();
        let global = reduce(catalog, &states);
        stats.reduce = ReduceStats {
            cells: global.cells.len(),
            total_posts: global.cells.values().map(|t| t.post_count).sum(),
            wall_ms: reduce_start.elapsed().as_millis() as u64,
        };
        info!(
            phase = "reduce",
            cells = stats.reduce.cells,
            total_posts = stats.reduce.total_posts,
            wall_ms = stats.reduce.wall_ms,
            "Reduce phase complete"
        );

        let report = rank(&global);
        Ok(JobOutcome { report, stats })
    }
}

use crate::scan::ScanOutcome;
use serde::Serialize;

#[derive(Default, Clone, Debug, Serialize)]
pub struct IndexStats {
    pub lines: usize,
    pub rebuilt: bool,
    pub wall_ms: u64,
}

#[derive(Default, Clone, Debug, Serialize)]
pub struct ScanStats {
    pub workers: usize,
    pub lines_read: u64,
    pub posts_usable: u64,
    pub lines_skipped: u64,
    pub min_worker_ms: u64,
    pub max_worker_ms: u64,
    pub wall_ms: u64,
}

impl ScanStats {
    pub fn from_outcomes(outcomes: &[ScanOutcome], wall_ms: u64) -> Self {
        Self {
            workers: outcomes.len(),
            lines_read: outcomes.iter().map(|o| o.lines_read).sum(),
            posts_usable: outcomes.iter().map(|o| o.posts_usable).sum(),
            lines_skipped: outcomes.iter().map(|o| o.lines_skipped).sum(),
            min_worker_ms: outcomes.iter().map(|o| o.wall_ms).min().unwrap_or(0),
            max_worker_ms: outcomes.iter().map(|o| o.wall_ms).max().unwrap_or(0),
            wall_ms,
        }
    }
}

#[derive(Default, Clone, Debug, Serialize)]
pub struct ReduceStats {
    pub cells: usize,
    pub total_posts: u64,
    pub wall_ms: u64,
}

/// Per-phase accounting for one aggregation run, logged at phase
/// completion and returned with the report.
#[derive(Default, Clone, Debug, Serialize)]
pub struct JobStats {
    pub index: IndexStats,
    pub scan: ScanStats,
    pub reduce: ReduceStats,
}

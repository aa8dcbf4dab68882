use crate::grid::GridCatalog;
use crate::tally::{CellTally, WorkerState};
use ahash::AHashMap;

/// Every worker's counters merged into one table, one entry per catalog
/// cell. Created zeroed, written only during the single reduction pass,
/// then handed to the ranker read-only.
#[derive(Clone, Debug, Default)]
pub struct GlobalAccumulator {
    pub cells: AHashMap<String, CellTally>,
}

/// Single-round reduction over the per-worker states. Starts from a zeroed
/// entry for every catalog cell, so cells nothing landed in still appear
/// in the final report. The merge treats absent entries as zero on both
/// sides and never mutates a worker's state.
pub fn reduce(catalog: &GridCatalog, states: &[WorkerState]) -> GlobalAccumulator {
    let mut cells: AHashMap<String, CellTally> = catalog
        .cells()
        .iter()
        .map(|c| (c.id.clone(), CellTally::default()))
        .collect();

    for state in states {
        for (cell_id, tally) in state {
            cells.entry(cell_id.clone()).or_default().merge_from(tally);
        }
    }
    GlobalAccumulator { cells }
}

use crate::grid::GridCatalog;
use crate::partition::LineRange;
use crate::scan::ScanOutcome;
use anyhow::Result;
use std::path::Path;

/// Fan-out seam between the coordinator and its scan workers: hand every
/// worker one range, get every worker's outcome back, in assignment order.
///
/// Implementations decide what carries the assignment out and the state
/// back (in-process threads here; processes or remote workers elsewhere);
/// the coordinator relies only on this contract. An implementation must
/// fail the whole call if any worker fails; a silently missing partition
/// would corrupt the global counts without detection.
pub trait ScanExecutor {
    fn execute(
        &self,
        path: &Path,
        catalog: &GridCatalog,
        assignments: &[LineRange],
    ) -> Result<Vec<ScanOutcome>>;
}

use crate::index::LineOffsetIndex;
use serde::{Deserialize, Serialize};

/// A contiguous span of data-file lines owned by exactly one worker: the
/// byte offset of its first line and a strict line-count budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start_offset: u64,
    pub line_budget: usize,
}

impl LineRange {
    pub fn is_empty(&self) -> bool {
        self.line_budget == 0
    }
}

/// Split the indexed lines into `worker_count` contiguous, near-equal
/// ranges. The first and last index entries are excluded before splitting:
/// the export header and footer lines are not records. The remainder of
/// the integer division goes to the earliest chunks, so no chunk differs
/// from another by more than one line. Same index and worker count always
/// produce identical ranges.
pub fn partition(index: &LineOffsetIndex, worker_count: usize) -> Vec<LineRange> {
    let worker_count = worker_count.max(1);
    let offsets = index.offsets();
    let interior: &[u64] = if offsets.len() > 2 {
        &offsets[1..offsets.len() - 1]
    } else {
        &[]
    };

    let base = interior.len() / worker_count;
    let remainder = interior.len() % worker_count;

    let mut ranges = Vec::with_capacity(worker_count);
    let mut cursor = 0usize;
    for i in 0..worker_count {
        let budget = base + usize::from(i < remainder);
        let start_offset = if budget == 0 { 0 } else { interior[cursor] };
        ranges.push(LineRange { start_offset, line_budget: budget });
        cursor += budget;
    }
    ranges
}

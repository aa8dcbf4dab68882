use crate::extract::{extract, Extracted};
use crate::grid::GridCatalog;
use crate::io::open_reader_at;
use crate::partition::LineRange;
use crate::tally::WorkerState;
use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// What one worker produced from its range: the per-cell accumulators plus
/// skip accounting for the scan summary.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub state: WorkerState,
    pub lines_read: u64,
    pub posts_usable: u64,
    pub lines_skipped: u64,
    pub wall_ms: u64,
}

/// Stream one assigned range through the extractor and fold every usable
/// post into this worker's own accumulators.
///
/// The budget is a strict line count: reading stops the moment it is
/// exhausted, regardless of how many bytes the reader buffered ahead.
/// Record-level damage is skipped (and logged at debug with the 1-based
/// line position inside the range); only an I/O failure is fatal, since a
/// silently dropped partition would corrupt the global counts.
pub fn scan_range(path: &Path, range: LineRange, catalog: &GridCatalog) -> Result<ScanOutcome> {
    let start = Instant::now();
    let mut outcome = ScanOutcome::default();
    if range.is_empty() {
        return Ok(outcome);
    }

    let mut reader = open_reader_at(path, range.start_offset)?;
    let mut line: Vec<u8> = Vec::with_capacity(4096);
    for line_no in 1..=range.line_budget {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .with_context(|| format!("read line {} of range at {}", line_no, range.start_offset))?;
        if n == 0 {
            // budget outlived the file; nothing left to read
            break;
        }
        outcome.lines_read += 1;

        match extract(&line) {
            Extracted::Post(post) => {
                outcome.posts_usable += 1;
                let Some((x, y)) = post.coordinate else { continue };
                // Every cell is tested, not just the first match; a post on
                // overlapping cells counts toward all of them.
                for cell in catalog.cells() {
                    if cell.contains(x, y) {
                        outcome
                            .state
                            .entry(cell.id.clone())
                            .or_default()
                            .record_post(post.hashtags.iter().map(String::as_str));
                    }
                }
            }
            Extracted::Unusable(reason) => {
                outcome.lines_skipped += 1;
                debug!(line = line_no, reason = ?reason, "skipping unusable record");
            }
        }
    }

    outcome.wall_ms = start.elapsed().as_millis() as u64;
    Ok(outcome)
}

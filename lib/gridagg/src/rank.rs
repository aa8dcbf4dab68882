use crate::reduce::GlobalAccumulator;
use ahash::AHashMap;
use rayon::prelude::*;
use serde::Serialize;

/// Hashtag entries kept per cell before tie extension.
pub const TOP_HASHTAGS: usize = 5;

/// One ranked cell: id, post volume, and the kept hashtag/frequency pairs
/// in display order. Formatting for the operator is the consumer's job.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellReport {
    pub cell_id: String,
    pub post_count: u64,
    pub top_hashtags: Vec<(String, u64)>,
}

pub type RankedReport = Vec<CellReport>;

/// Order cells by post count descending and rank each cell's hashtags.
///
/// Equal-volume cells fall back to cell id ascending and equal-frequency
/// hashtags to text ascending; neither order is inherited from the data,
/// they are fixed here so repeated runs are byte-identical.
pub fn rank(global: &GlobalAccumulator) -> RankedReport {
    let mut report: RankedReport = global
        .cells
        .par_iter()
        .map(|(id, tally)| CellReport {
            cell_id: id.clone(),
            post_count: tally.post_count,
            top_hashtags: top_hashtags(&tally.hashtag_frequency),
        })
        .collect();
    report.sort_by(|a, b| {
        b.post_count
            .cmp(&a.post_count)
            .then_with(|| a.cell_id.cmp(&b.cell_id))
    });
    report
}

/// Keep the `TOP_HASHTAGS` most frequent entries, extending through every
/// entry tied with the last kept rank: a cutoff that would split a tie
/// would otherwise drop members of it arbitrarily.
fn top_hashtags(freq: &AHashMap<String, u64>) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> =
        freq.iter().map(|(tag, n)| (tag.clone(), *n)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    if entries.len() <= TOP_HASHTAGS {
        return entries;
    }
    let cutoff = entries[TOP_HASHTAGS - 1].1;
    let mut end = TOP_HASHTAGS;
    while end < entries.len() && entries[end].1 == cutoff {
        end += 1;
    }
    entries.truncate(end);
    entries
}

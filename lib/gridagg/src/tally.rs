use ahash::AHashMap;

/// Per-cell counters: post volume and a case-folded hashtag frequency
/// table. Owned by exactly one worker during the scan phase; read-only
/// once handed to the reducer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellTally {
    pub post_count: u64,
    pub hashtag_frequency: AHashMap<String, u64>,
}

impl CellTally {
    /// Fold one post into this cell. Hashtags are lower-cased here so the
    /// counts are case-insensitive; a post with no hashtags still counts.
    pub fn record_post<'a>(&mut self, hashtags: impl IntoIterator<Item = &'a str>) {
        self.post_count += 1;
        for tag in hashtags {
            *self.hashtag_frequency.entry(tag.to_lowercase()).or_insert(0) += 1;
        }
    }

    /// Commutative, associative merge over both counters, treating absent
    /// entries as zero. The same operation serves in-worker accumulation
    /// and the cross-worker reduction, which is what makes the final
    /// result independent of merge order.
    pub fn merge_from(&mut self, other: &CellTally) {
        self.post_count += other.post_count;
        for (tag, n) in &other.hashtag_frequency {
            *self.hashtag_frequency.entry(tag.clone()).or_insert(0) += n;
        }
    }
}

/// One worker's accumulators, keyed by cell id. Only cells the worker
/// actually hit appear here; the reducer fills in the rest.
pub type WorkerState = AHashMap<String, CellTally>;

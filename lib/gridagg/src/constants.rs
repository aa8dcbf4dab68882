//! Centralized environment variable names and defaults for runtime tuning.

// Environment variable names
pub const ENV_WORKERS: &str = "GRIDAGG_WORKERS";
pub const ENV_FORCE_REINDEX: &str = "GRIDAGG_FORCE_REINDEX";

// Defaults
/// Suffix appended to the data file name for the persisted offset index
/// (`posts.ndjson` -> `posts.ndjson.lineidx`).
pub const INDEX_SIDE_SUFFIX: &str = "lineidx";
/// Read buffer per scan worker. Workers stream line by line, so this only
/// bounds syscall frequency, never how many lines a worker consumes.
pub const SCAN_BUF_BYTES: usize = 256 * 1024;

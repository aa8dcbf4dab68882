use crate::constants::INDEX_SIDE_SUFFIX;
use crate::io::{read_bytes, write_bytes};
use anyhow::{Context, Result};
use memchr::memchr;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Byte offset of every line start in the data file, in file order.
///
/// Convention: one entry per line, no trailing sentinel. A line starts at
/// offset 0 and immediately after every `\n` that has at least one byte
/// after it. Downstream range math carries (start offset, line budget)
/// pairs, so a sentinel is never needed.
///
/// Built once with a single sequential binary scan, persisted next to the
/// data file, and treated as immutable afterwards. Rebuilding after the
/// data file changes is the caller's responsibility.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOffsetIndex {
    offsets: Vec<u64>,
}

impl LineOffsetIndex {
    pub fn from_offsets(offsets: Vec<u64>) -> Self {
        Self { offsets }
    }

    /// Scan the file in binary mode and record every line-start offset.
    /// Byte positions are exact regardless of line-ending width.
    pub fn build(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("open data file {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("stat data file {}", path.display()))?
            .len();
        if len == 0 {
            return Ok(Self { offsets: Vec::new() });
        }
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("mmap data file {}", path.display()))?;
        let bytes = &mmap[..];

        let mut offsets = Vec::new();
        let mut pos = 0usize;
        while pos < bytes.len() {
            offsets.push(pos as u64);
            match memchr(b'\n', &bytes[pos..]) {
                Some(nl) => pos += nl + 1,
                None => break,
            }
        }
        Ok(Self { offsets })
    }

    /// Side file holding the persisted offsets for `data_path`.
    pub fn side_file_path(data_path: impl AsRef<Path>) -> PathBuf {
        let data_path = data_path.as_ref();
        match data_path.extension().and_then(|e| e.to_str()) {
            Some(ext) => data_path.with_extension(format!("{}.{}", ext, INDEX_SIDE_SUFFIX)),
            None => data_path.with_extension(INDEX_SIDE_SUFFIX),
        }
    }

    pub fn persist(&self, side_path: impl AsRef<Path>) -> Result<()> {
        let encoded = bincode::serialize(&self.offsets).context("encode offset index")?;
        write_bytes(side_path, &encoded)
    }

    pub fn load(side_path: impl AsRef<Path>) -> Result<Self> {
        let bytes = read_bytes(side_path.as_ref())?;
        let offsets = bincode::deserialize(&bytes).with_context(|| {
            format!("decode offset index {}", side_path.as_ref().display())
        })?;
        Ok(Self { offsets })
    }

    /// Reuse the persisted index when one exists, otherwise build and
    /// persist a fresh one. An unreadable side file is rebuilt rather
    /// than failing the run. Returns the index and whether it was rebuilt.
    pub fn load_or_build(data_path: impl AsRef<Path>, force_rebuild: bool) -> Result<(Self, bool)> {
        let data_path = data_path.as_ref();
        let side = Self::side_file_path(data_path);
        if !force_rebuild && side.exists() {
            match Self::load(&side) {
                Ok(index) => return Ok((index, false)),
                Err(e) => {
                    warn!(side = %side.display(), error = %e, "persisted index unreadable, rebuilding");
                }
            }
        }
        let index = Self::build(data_path)?;
        index.persist(&side)?;
        Ok((index, true))
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

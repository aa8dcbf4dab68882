use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::constants::SCAN_BUF_BYTES;

pub fn read_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    fs::read(path.as_ref()).with_context(|| format!("read {}", path.as_ref().display()))
}

pub fn write_bytes(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    fs::write(path.as_ref(), bytes).with_context(|| format!("write {}", path.as_ref().display()))
}

/// Open a buffered reader positioned at `offset`. Every scan worker gets
/// its own handle and seek position; the file itself is never locked.
pub fn open_reader_at(path: impl AsRef<Path>, offset: u64) -> Result<BufReader<File>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = BufReader::with_capacity(SCAN_BUF_BYTES, file);
    reader
        .seek(SeekFrom::Start(offset))
        .with_context(|| format!("seek to {} in {}", offset, path.display()))?;
    Ok(reader)
}

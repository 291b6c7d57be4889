//! Line-delimited record log: locked append, lock-free scan.
//!
//! Each record is one compact JSON object per newline-terminated line.
//! Appends go through [`append`], which requires proof that the caller
//! holds the directory lock. Scans take no lock: the logs are append-only,
//! so the only race is a partially-written trailing line, and those are
//! tolerated by skipping anything that fails to parse.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::error::Result;
use crate::lock::DirLockGuard;

/// Append one record to the log as a single JSON line.
///
/// Creates the file if it does not exist. The file is opened in append
/// mode, so the write lands at the current end of file even if other
/// processes appended since the log was last touched. When `sync` is set
/// the line is fsynced before the call returns.
///
/// The `_guard` parameter is the proof of mutual exclusion: only code
/// holding the directory lock can append.
pub fn append<T: Serialize>(
    _guard: &DirLockGuard,
    path: &Path,
    record: &T,
    sync: bool,
) -> Result<()> {
    let line = serde_json::to_string(record)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    if sync {
        file.sync_all()?;
    }

    trace!(log = %path.display(), bytes = line.len() + 1, "appended record");
    Ok(())
}

/// Lazily iterate over all records in a log, in file order.
///
/// A missing file yields an empty sequence. Lines that cannot be read or
/// parsed are skipped, not surfaced: a torn trailing write must never
/// poison a scan. The iterator is restartable by calling `scan` again.
pub fn scan(path: &Path) -> impl Iterator<Item = Value> {
    File::open(path)
        .ok()
        .map(BufReader::new)
        .into_iter()
        .flat_map(BufRead::lines)
        .filter_map(std::result::Result::ok)
        .filter_map(|line| serde_json::from_str(&line).ok())
}

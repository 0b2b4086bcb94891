//! Rebuild on Delete
//!
//! The file format has no in-place removal, so a delete rewrites the store.
//!
//! ## Procedure
//! 1. Read every record, keeping all but the first one with the deleted id
//! 2. Write the kept records, in order, to the temp file and close it
//! 3. Close the active file
//! 4. Rename the active file to its timestamped backup name
//! 5. Rename the temp file to the active file name
//! 6. Reopen the active file
//!
//! A failure in steps 1-2 leaves the store untouched. A failure in steps 4-6
//! leaves the store without an active file; every later operation returns
//! `NoActiveFile`.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::config::{StoreConfig, BACKUP_TIMESTAMP_FORMAT};
use crate::error::{FlatbookError, Result};
use crate::record::{key_of, Book, BookId, RecordCodec};

use super::store::{open_active, Store};

/// Outcome of a successful delete
#[derive(Debug, Clone)]
pub struct Deleted {
    /// The removed record
    pub record: Book,

    /// Where the pre-delete file now lives
    pub backup_path: PathBuf,

    /// Records left in the store
    pub remaining: u64,
}

/// Rebuild `store` without the first record whose id equals `key`
///
/// Returns `None` without touching any file when no record matches.
pub(super) fn rebuild_without(
    store: &mut Store,
    key: BookId,
    timestamp: NaiveDateTime,
) -> Result<Option<Deleted>> {
    // Step 1: Read the surviving records
    let mut retained = store.scan()?;
    let Some(position) = retained.iter().position(|book| key_of(book) == key) else {
        tracing::debug!(id = key, "delete skipped, no such record");
        return Ok(None);
    };
    let record = retained.remove(position);

    // Step 2: Write them to the temp file
    let temp_path = store.config.temp_path();
    write_records(&temp_path, &mut store.codec, &retained)?;

    // Step 3: Close the active file
    if let Some(file) = store.file.as_ref() {
        file.sync_all()?;
    }
    store.file = None;

    // Steps 4-6: Swap files and reopen
    let backup_path = unused_backup_path(&store.config, timestamp);
    match swap_files(&store.path, &temp_path, &backup_path) {
        Ok(file) => store.file = Some(file),
        Err(e) => {
            tracing::error!(
                path = %store.path.display(),
                error = %e,
                "rebuild failed after closing the store; no active file"
            );
            return Err(e);
        }
    }

    store.record_count -= 1;

    tracing::info!(
        id = record.id,
        backup = %backup_path.display(),
        remaining = store.record_count,
        "record deleted, store rebuilt"
    );

    Ok(Some(Deleted {
        record,
        backup_path,
        remaining: store.record_count,
    }))
}

/// Create/truncate `path` and write `records` back to back
fn write_records(path: &Path, codec: &mut RecordCodec, records: &[Book]) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    let mut writer = BufWriter::new(file);
    for book in records {
        writer.write_all(&codec.encode(book)?)?;
    }
    writer.flush()?;

    let file = writer
        .into_inner()
        .map_err(|e| FlatbookError::Io(e.into_error()))?;
    file.sync_all()?;
    Ok(())
}

fn swap_files(active: &Path, temp: &Path, backup: &Path) -> Result<File> {
    fs::rename(active, backup)?;
    fs::rename(temp, active)?;
    open_active(active)
}

/// Backup path for `timestamp`, suffixed `-1`, `-2`, ... if already taken
fn unused_backup_path(config: &StoreConfig, timestamp: NaiveDateTime) -> PathBuf {
    let path = config.backup_path(timestamp);
    if !path.exists() {
        return path;
    }

    let stamp = timestamp.format(BACKUP_TIMESTAMP_FORMAT).to_string();
    (1u32..)
        .map(|n| {
            config.data_dir.join(format!(
                "{}{}-{}.{}",
                config.base_name, stamp, n, config.extension
            ))
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or(path)
}

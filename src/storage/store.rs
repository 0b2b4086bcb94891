//! Store
//!
//! The storage engine: one open file, an in-memory record count, and a codec
//! that remembers the record size.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::config::{CountOnOpen, StoreConfig};
use crate::error::{FlatbookError, Result};
use crate::record::{key_of, Book, BookId, RecordCodec};

use super::iterator::Records;
use super::rebuild::{self, Deleted};

/// A fixed-record book store backed by a single file
///
/// ## Concurrency
///
/// None. Mutating operations take `&mut self`; nothing guards the file
/// against other processes.
pub struct Store {
    pub(super) config: StoreConfig,

    /// Active file path, `{data_dir}/{base_name}.{extension}`
    pub(super) path: PathBuf,

    /// Active file; `None` only after a rebuild failed past closing it
    pub(super) file: Option<File>,

    pub(super) codec: RecordCodec,

    pub(super) record_count: u64,
}

impl Store {
    /// Open or create the store described by `config`
    ///
    /// On startup:
    /// 1. Create the data directory if needed
    /// 2. Open/create the active file read-write
    /// 3. Initialize the record count per `count_on_open`
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        // Step 1: Data directory
        fs::create_dir_all(&config.data_dir)?;

        // Step 2: Active file
        let path = config.active_path();
        let file = open_active(&path)?;

        // Step 3: Record count
        let mut codec = RecordCodec::from_config(&config);
        let record_count = match config.count_on_open {
            CountOnOpen::Derive => {
                let len = file.metadata()?.len();
                if len == 0 {
                    0
                } else {
                    let record_size = codec.layout_size();
                    if len % record_size != 0 {
                        return Err(FlatbookError::MisalignedFile { len, record_size });
                    }
                    codec.establish(record_size)?;
                    len / record_size
                }
            }
            CountOnOpen::Zero => 0,
        };

        tracing::info!(
            path = %path.display(),
            records = record_count,
            "store opened"
        );

        Ok(Self {
            config,
            path,
            file: Some(file),
            codec,
            record_count,
        })
    }

    /// Open with a data directory (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(dir: &Path) -> Result<Self> {
        let config = StoreConfig::builder().data_dir(dir).build()?;
        Self::open(config)
    }

    /// Append a book at the logical end of the store
    ///
    /// Duplicate ids are not checked. Fails with `CapacityExceeded` once
    /// `max_records` books are stored, without touching the file.
    pub fn add(&mut self, book: &Book) -> Result<()> {
        if self.record_count >= self.config.max_records {
            tracing::warn!(
                id = book.id,
                max = self.config.max_records,
                "store full, add refused"
            );
            return Err(FlatbookError::CapacityExceeded {
                max: self.config.max_records,
            });
        }

        let file = self.file.as_mut().ok_or(FlatbookError::NoActiveFile)?;
        let block = self.codec.encode(book)?;
        let offset = self.record_count * block.len() as u64;

        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&block)?;
        self.record_count += 1;

        tracing::debug!(id = book.id, offset, records = self.record_count, "record added");
        Ok(())
    }

    /// Iterate over all records in storage order
    pub fn iter(&mut self) -> Result<Records<'_>> {
        let file = self.file.as_mut().ok_or(FlatbookError::NoActiveFile)?;
        file.seek(SeekFrom::Start(0))?;
        Ok(Records::new(file, &mut self.codec, self.record_count))
    }

    /// Read all records in storage order
    ///
    /// Stops at the first error and returns it, discarding the records read
    /// before it. Use `iter` to observe records read before an error.
    pub fn scan(&mut self) -> Result<Vec<Book>> {
        self.iter()?.collect()
    }

    /// First book in storage order whose id equals `key`
    pub fn find(&mut self, key: BookId) -> Result<Option<Book>> {
        Ok(self.locate(key)?.map(|(_, book)| book))
    }

    /// Overwrite the first record whose id matches `book.id`
    ///
    /// The record keeps its offset even if the id changes. Returns the
    /// previous value, or `None` (and writes nothing) when no record matches.
    pub fn update(&mut self, book: &Book) -> Result<Option<Book>> {
        let key = key_of(book);
        let Some((index, previous)) = self.locate(key)? else {
            tracing::debug!(id = key, "update skipped, no such record");
            return Ok(None);
        };

        let file = self.file.as_mut().ok_or(FlatbookError::NoActiveFile)?;
        let block = self.codec.encode(book)?;
        // Start of the matched record, one record width behind the scan cursor
        let offset = index * block.len() as u64;

        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&block)?;

        tracing::debug!(id = key, new_id = book.id, offset, "record updated");
        Ok(Some(previous))
    }

    /// Remove the first record whose id equals `key`
    ///
    /// Rebuilds the file without that record and keeps the old file as a
    /// timestamped backup. Returns `None` (and changes nothing) when no
    /// record matches.
    pub fn delete(&mut self, key: BookId) -> Result<Option<Deleted>> {
        self.delete_at(key, Local::now().naive_local())
    }

    /// `delete`, naming the backup after `timestamp` instead of the current time
    pub fn delete_at(&mut self, key: BookId, timestamp: NaiveDateTime) -> Result<Option<Deleted>> {
        rebuild::rebuild_without(self, key, timestamp)
    }

    /// Flush file contents to disk
    pub fn sync(&mut self) -> Result<()> {
        let file = self.file.as_mut().ok_or(FlatbookError::NoActiveFile)?;
        file.sync_data()?;
        Ok(())
    }

    /// Sync and release the file handle
    pub fn close(mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        tracing::debug!(path = %self.path.display(), "store closed");
        Ok(())
    }

    /// Index and value of the first record with id `key`
    fn locate(&mut self, key: BookId) -> Result<Option<(u64, Book)>> {
        for (index, record) in self.iter()?.enumerate() {
            let book = record?;
            if key_of(&book) == key {
                return Ok(Some((index as u64, book)));
            }
        }
        Ok(None)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of records
    pub fn len(&self) -> u64 {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Established record size in bytes, 0 before the first read or write
    pub fn record_size(&self) -> u64 {
        self.codec.record_size().unwrap_or(0)
    }

    /// Path of the active file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// False after a rebuild lost the active file
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

/// Open a store file read-write, creating it when absent
pub(super) fn open_active(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    Ok(file)
}

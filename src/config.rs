//! Configuration for flatbook
//!
//! Centralized configuration with defaults matching the classic `Books.dat` store.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::error::{FlatbookError, Result};

/// Main configuration for a flatbook store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // File Layout
    // -------------------------------------------------------------------------
    /// Directory holding the active file, the temp file and all backups
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── Books.dat                    (active store)
    ///     ├── temp.dat                     (only during a rebuild)
    ///     └── Books26.10.16.09.30.00.dat   (one backup per delete)
    pub data_dir: PathBuf,

    /// Stem of the active file name
    pub base_name: String,

    /// Extension of the active file name, without the dot
    pub extension: String,

    /// File name used while rebuilding on delete
    pub temp_name: String,

    // -------------------------------------------------------------------------
    // Record Configuration
    // -------------------------------------------------------------------------
    /// Maximum number of records the store accepts
    pub max_records: u64,

    /// Width of the title field, in UTF-16 units
    pub title_width: usize,

    /// What to do with titles longer than `title_width`
    pub title_overflow: TitleOverflow,

    // -------------------------------------------------------------------------
    // Open Behavior
    // -------------------------------------------------------------------------
    /// How the record count is initialized when the store is opened
    pub count_on_open: CountOnOpen,
}

/// Handling of titles wider than the fixed field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleOverflow {
    /// Cut the title to the field width (classic behavior)
    Truncate,

    /// Fail the write with `FieldOverflow`
    Reject,
}

/// Record count initialization on open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOnOpen {
    /// `record_count = file_len / record_size`
    Derive,

    /// Start at zero regardless of file contents; the next add overwrites offset 0
    Zero,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./flatbook_data"),
            base_name: "Books".to_string(),
            extension: "dat".to_string(),
            temp_name: "temp.dat".to_string(),
            max_records: 1000,
            title_width: 48,
            title_overflow: TitleOverflow::Truncate,
            count_on_open: CountOnOpen::Derive,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Path of the active store file
    pub fn active_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", self.base_name, self.extension))
    }

    /// Path of the temporary file written during a rebuild
    pub fn temp_path(&self) -> PathBuf {
        self.data_dir.join(&self.temp_name)
    }

    /// Path of the backup taken at `timestamp`
    ///
    /// This is the name a delete tries first. If it is already taken, the
    /// delete appends `-1`, `-2`, ... to the stem instead of overwriting:
    /// `<base><yy.MM.dd.HH.mm.ss>-<n>.<ext>`.
    pub fn backup_path(&self, timestamp: NaiveDateTime) -> PathBuf {
        self.data_dir.join(backup_file_name(
            &self.base_name,
            &self.extension,
            timestamp,
        ))
    }

    /// Check field values; `StoreConfigBuilder::build` calls this
    pub fn validate(&self) -> Result<()> {
        if self.title_width == 0 {
            return Err(FlatbookError::Config("title_width must be > 0".into()));
        }
        if self.title_width > MAX_TITLE_WIDTH {
            return Err(FlatbookError::Config(format!(
                "title_width must be <= {}",
                MAX_TITLE_WIDTH
            )));
        }
        if self.max_records == 0 {
            return Err(FlatbookError::Config("max_records must be > 0".into()));
        }
        check_file_name("base_name", &self.base_name)?;
        check_file_name("temp_name", &self.temp_name)?;
        if self.extension.contains(&['/', '\\', '.'][..]) {
            return Err(FlatbookError::Config(format!(
                "extension must not contain separators or dots: {:?}",
                self.extension
            )));
        }
        if format!("{}.{}", self.base_name, self.extension) == self.temp_name {
            return Err(FlatbookError::Config(
                "temp_name must differ from the active file name".into(),
            ));
        }
        Ok(())
    }
}

/// Widest title field, in UTF-16 units
pub const MAX_TITLE_WIDTH: usize = u16::MAX as usize;

/// `yy.MM.dd.HH.mm.ss`
pub(crate) const BACKUP_TIMESTAMP_FORMAT: &str = "%y.%m.%d.%H.%M.%S";

/// Backup file name: `<base><yy.MM.dd.HH.mm.ss>.<ext>`
pub fn backup_file_name(base: &str, extension: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{}{}.{}",
        base,
        timestamp.format(BACKUP_TIMESTAMP_FORMAT),
        extension
    )
}

fn check_file_name(field: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FlatbookError::Config(format!("{} must not be empty", field)));
    }
    if name.contains(&['/', '\\'][..]) || name == "." || name == ".." {
        return Err(FlatbookError::Config(format!(
            "{} must be a plain file name: {:?}",
            field, name
        )));
    }
    Ok(())
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the active file stem (default `Books`)
    pub fn base_name(mut self, name: impl Into<String>) -> Self {
        self.config.base_name = name.into();
        self
    }

    /// Set the active file extension (default `dat`)
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.config.extension = ext.into();
        self
    }

    /// Set the rebuild temp file name (default `temp.dat`)
    pub fn temp_name(mut self, name: impl Into<String>) -> Self {
        self.config.temp_name = name.into();
        self
    }

    /// Set the record capacity
    pub fn max_records(mut self, max: u64) -> Self {
        self.config.max_records = max;
        self
    }

    /// Set the title field width (in UTF-16 units)
    pub fn title_width(mut self, width: usize) -> Self {
        self.config.title_width = width;
        self
    }

    /// Set the title overflow policy
    pub fn title_overflow(mut self, policy: TitleOverflow) -> Self {
        self.config.title_overflow = policy;
        self
    }

    /// Set how the record count is initialized on open
    pub fn count_on_open(mut self, policy: CountOnOpen) -> Self {
        self.config.count_on_open = policy;
        self
    }

    pub fn build(self) -> Result<StoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

//! Error types for flatbook
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FlatbookError
pub type Result<T> = std::result::Result<T, FlatbookError>;

/// Unified error type for flatbook operations
#[derive(Debug, Error)]
pub enum FlatbookError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    /// Bytes produced or consumed by one record differ from the established size.
    #[error("Record size violation: expected {expected} bytes, got {actual}")]
    RecordSizeViolation { expected: u64, actual: u64 },

    #[error("Truncated record: expected {expected} bytes, found {found}")]
    TruncatedRecord { expected: u64, found: u64 },

    #[error("Field '{field}' overflows its width: {len} units > {width}")]
    FieldOverflow {
        field: &'static str,
        width: usize,
        len: usize,
    },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Store is full: {max} records")]
    CapacityExceeded { max: u64 },

    #[error("Store file length {len} is not a multiple of the record size {record_size}")]
    MisalignedFile { len: u64, record_size: u64 },

    /// A rebuild failed after the active file was closed.
    #[error("Store has no active file")]
    NoActiveFile,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

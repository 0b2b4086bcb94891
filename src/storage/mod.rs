//! Storage Module
//!
//! Linear single-file storage of fixed-size book records.
//!
//! ## Responsibilities
//! - Append records at `record_count * record_size`
//! - Sequential scans and first-match lookups from offset 0
//! - In-place updates at the matched record's offset
//! - Delete by rebuilding the file and keeping the old one as a backup
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Record 0   (offset 0)                  │
//! ├────────────────────────────────────────┤
//! │ Record 1   (offset record_size)        │
//! ├────────────────────────────────────────┤
//! │ ...                                    │
//! ├────────────────────────────────────────┤
//! │ Record n-1 (offset (n-1)*record_size)  │
//! └────────────────────────────────────────┘
//! ```
//!
//! No header and no footer. The record count lives in memory only.

mod iterator;
mod rebuild;
mod store;

pub use iterator::Records;
pub use rebuild::Deleted;
pub use store::Store;

//! # flatbook
//!
//! A single-table flat-file store of book records:
//! - Fixed-size, byte-exact binary records (big-endian, UTF-16 titles)
//! - Append, sequential scan, first-match lookup, in-place update
//! - Delete by full rebuild, keeping the old file as a timestamped backup
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        flatbook CLI                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Store                                 │
//! │        add / scan / find / update / delete                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────┐
//!   │ RecordCodec │          │   Rebuild    │
//!   │ (fixed-size)│          │ (on delete)  │
//!   └─────────────┘          └──────┬───────┘
//!                                   │
//!                                   ▼
//!                      Books.dat  +  Books<yy.MM.dd.HH.mm.ss>.dat
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use flatbook::{Book, Store, StoreConfig};
//!
//! # fn main() -> flatbook::Result<()> {
//! let config = StoreConfig::builder().data_dir("./library").build()?;
//! let mut store = Store::open(config)?;
//!
//! store.add(&Book::new(20, "Wild", 2012, 12.15))?;
//! if let Some(mut book) = store.find(20)? {
//!     book.price = 9.99;
//!     store.update(&book)?;
//! }
//! store.delete(20)?;
//! store.close()
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FlatbookError, Result};
pub use config::{CountOnOpen, StoreConfig, TitleOverflow};
pub use record::{key_of, Book, BookId, RecordCodec};
pub use storage::{Deleted, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of flatbook
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

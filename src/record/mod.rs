//! Record Module
//!
//! The book entity and its fixed-width binary encoding.
//!
//! ## Record Format
//! ```text
//! ┌──────────┬────────────────────────────┬───────────┬──────────┐
//! │  Id (4)  │ Title (2 × title_width)    │ Price (8) │ Year (4) │
//! │  i32 BE  │ UTF-16 BE, space padded    │  f64 BE   │  i32 BE  │
//! └──────────┴────────────────────────────┴───────────┴──────────┘
//! ```
//!
//! With the default width of 48 units a record is 112 bytes. Records carry no
//! header, length prefix or checksum; position alone identifies them.

mod codec;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use codec::{normalize_title, RecordCodec, ID_SIZE, PRICE_SIZE, TITLE_UNIT_SIZE, YEAR_SIZE};

/// Key type of the store
pub type BookId = i32;

/// A single book record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Record key; uniqueness is a caller convention, not enforced
    pub id: BookId,

    /// Title; decoded titles keep their trailing space padding
    pub title: String,

    /// Year of publication
    pub year: i32,

    /// Price
    pub price: f64,
}

impl Book {
    pub fn new(id: BookId, title: impl Into<String>, year: i32, price: f64) -> Self {
        Self {
            id,
            title: title.into(),
            year,
            price,
        }
    }

    /// Title without the fixed-width padding
    pub fn display_title(&self) -> &str {
        self.title.trim_end_matches(' ')
    }
}

/// Extract the lookup key from a book
pub fn key_of(book: &Book) -> BookId {
    book.id
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ISBN{:>11} {}", ":", self.id)?;
        writeln!(f, "Title{:>10} {}", ":", self.display_title())?;
        writeln!(f, "Price{:>10} ${:.2}", ":", self.price)?;
        writeln!(f, "Year published: {}", self.year)
    }
}

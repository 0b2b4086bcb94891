//! Record codec
//!
//! Encodes and decodes one book to and from its fixed-size block.
//!
//! The first successful encode or decode pins the record size. Every later
//! call must produce or consume exactly that many bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::config::{StoreConfig, TitleOverflow, MAX_TITLE_WIDTH};
use crate::error::{FlatbookError, Result};

use super::Book;

/// Bytes of the id field
pub const ID_SIZE: usize = 4;

/// Bytes per title unit (one UTF-16 code unit)
pub const TITLE_UNIT_SIZE: usize = 2;

/// Bytes of the price field
pub const PRICE_SIZE: usize = 8;

/// Bytes of the year field
pub const YEAR_SIZE: usize = 4;

/// Fixed-width record encoder/decoder
#[derive(Debug, Clone)]
pub struct RecordCodec {
    title_width: usize,
    overflow: TitleOverflow,
    /// Unset until the first encode/decode
    record_size: Option<u64>,
}

impl RecordCodec {
    pub fn new(title_width: usize, overflow: TitleOverflow) -> Self {
        Self {
            title_width,
            overflow,
            record_size: None,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.title_width, config.title_overflow)
    }

    /// Title field width in UTF-16 units
    pub fn title_width(&self) -> usize {
        self.title_width
    }

    /// Bytes one record occupies under this codec's field layout
    ///
    /// Saturates at `u64::MAX` for widths no store accepts.
    pub fn layout_size(&self) -> u64 {
        (self.title_width as u64)
            .checked_mul(TITLE_UNIT_SIZE as u64)
            .and_then(|title| title.checked_add((ID_SIZE + PRICE_SIZE + YEAR_SIZE) as u64))
            .unwrap_or(u64::MAX)
    }

    /// The established record size, if any I/O has happened yet
    pub fn record_size(&self) -> Option<u64> {
        self.record_size
    }

    /// Pin the record size before any record is read or written
    pub fn establish(&mut self, size: u64) -> Result<()> {
        self.check_size(size)
    }

    /// Encode a book into one fixed-size block
    pub fn encode(&mut self, book: &Book) -> Result<Bytes> {
        self.check_width()?;
        if self.overflow == TitleOverflow::Reject {
            let len = book.title.encode_utf16().count();
            if len > self.title_width {
                return Err(FlatbookError::FieldOverflow {
                    field: "title",
                    width: self.title_width,
                    len,
                });
            }
        }

        let mut buf = BytesMut::with_capacity(self.layout_size() as usize);
        buf.put_i32(book.id);
        for unit in title_units(&book.title, self.title_width) {
            buf.put_u16(unit);
        }
        buf.put_f64(book.price);
        buf.put_i32(book.year);

        self.check_size(buf.len() as u64)?;
        Ok(buf.freeze())
    }

    /// Decode one book from the front of `bytes`
    ///
    /// Bytes past one record are ignored.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<Book> {
        self.check_width()?;
        let needed = self
            .record_size
            .unwrap_or(0)
            .max(self.layout_size());
        if (bytes.len() as u64) < needed {
            return Err(FlatbookError::TruncatedRecord {
                expected: needed,
                found: bytes.len() as u64,
            });
        }

        let mut buf = bytes;
        let start = buf.remaining();

        let id = buf.get_i32();
        let mut units = Vec::with_capacity(self.title_width);
        for _ in 0..self.title_width {
            units.push(buf.get_u16());
        }
        let price = buf.get_f64();
        let year = buf.get_i32();

        self.check_size((start - buf.remaining()) as u64)?;

        Ok(Book {
            id,
            title: String::from_utf16_lossy(&units),
            year,
            price,
        })
    }

    /// Reject widths a store config would not accept, before allocating
    fn check_width(&self) -> Result<()> {
        if self.title_width == 0 || self.title_width > MAX_TITLE_WIDTH {
            return Err(FlatbookError::Config(format!(
                "title_width must be in 1..={}, got {}",
                MAX_TITLE_WIDTH, self.title_width
            )));
        }
        Ok(())
    }

    /// Set the record size on first use, verify it afterwards
    fn check_size(&mut self, actual: u64) -> Result<()> {
        match self.record_size {
            None => {
                self.record_size = Some(actual);
                Ok(())
            }
            Some(expected) if expected == actual => Ok(()),
            Some(expected) => Err(FlatbookError::RecordSizeViolation { expected, actual }),
        }
    }
}

/// Title as stored: cut to `width` units on a char boundary, then space padded
pub fn normalize_title(title: &str, width: usize) -> String {
    let mut out = String::with_capacity(width.min(MAX_TITLE_WIDTH));
    let mut used = 0;
    for c in title.chars() {
        if used + c.len_utf16() > width {
            break;
        }
        used += c.len_utf16();
        out.push(c);
    }
    out.extend(std::iter::repeat(' ').take(width - used));
    out
}

fn title_units(title: &str, width: usize) -> Vec<u16> {
    normalize_title(title, width).encode_utf16().collect()
}

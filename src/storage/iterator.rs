//! Record Iterator
//!
//! Sequential read of the first `record_count` records of a store file.

use std::fs::File;
use std::io::{BufReader, Read};

use crate::error::Result;
use crate::record::{Book, RecordCodec};

/// Iterator over stored books in storage order
///
/// Yields at most one error, after which it is exhausted. Books yielded
/// before the error are still valid.
pub struct Records<'a> {
    reader: BufReader<&'a mut File>,
    codec: &'a mut RecordCodec,
    /// Records still to read
    remaining: u64,
    /// Index of the next record
    position: u64,
    failed: bool,
}

impl<'a> Records<'a> {
    /// `file` must already be positioned at offset 0
    pub(super) fn new(file: &'a mut File, codec: &'a mut RecordCodec, count: u64) -> Self {
        Self {
            reader: BufReader::new(file),
            codec,
            remaining: count,
            position: 0,
            failed: false,
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Result<Book>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }

        match read_record(&mut self.reader, self.codec) {
            Ok(book) => {
                self.remaining -= 1;
                self.position += 1;
                Some(Ok(book))
            }
            Err(e) => {
                tracing::warn!(position = self.position, error = %e, "scan aborted");
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        (0, usize::try_from(self.remaining).ok())
    }
}

/// Read one record from the reader's current position
///
/// A short read surfaces as `TruncatedRecord` from the codec.
pub(super) fn read_record<R: Read>(reader: &mut R, codec: &mut RecordCodec) -> Result<Book> {
    let size = codec.record_size().unwrap_or_else(|| codec.layout_size());
    let mut block = Vec::with_capacity(size as usize);
    reader.by_ref().take(size).read_to_end(&mut block)?;
    codec.decode(&block)
}

use std::cell::Cell;
use std::io::Write;

use memchr::memmem;

use crate::error::Result;
use crate::registry::Registry;
use crate::tag::{Shape, Tag, TagHeader};

/// Written by a cyclical tag evaluated after its last record.
pub const CYCLE_EXHAUSTED_MARKER: &str = "no more data values in cyclical replace tag";

/// A named tag that yields one record of its data per evaluation.
///
/// The data is split on the record delimiter. Each evaluation writes the
/// record at the cursor and moves the cursor past the following delimiter;
/// a final record without a trailing delimiter is still yielded. Once the
/// data is used up, an evaluation writes [`CYCLE_EXHAUSTED_MARKER`] instead.
///
/// An empty record delimiter makes the whole data a single record.
#[derive(Debug)]
pub struct CyclicalTag {
    header: TagHeader,
    data: String,
    record_delimiter: String,
    // `None` once an evaluation found nothing left.
    cursor: Cell<Option<usize>>,
}

impl CyclicalTag {
    pub fn new(
        name: impl Into<String>,
        data: impl Into<String>,
        record_delimiter: impl Into<String>,
    ) -> Self {
        Self {
            header: TagHeader::new(name),
            data: data.into(),
            record_delimiter: record_delimiter.into(),
            cursor: Cell::new(Some(0)),
        }
    }

    pub fn record_delimiter(&self) -> &str {
        &self.record_delimiter
    }

    /// Whether every record has been yielded.
    pub fn is_exhausted(&self) -> bool {
        match self.cursor.get() {
            Some(position) => position >= self.data.len(),
            None => true,
        }
    }

    /// Returns the next record and advances past it.
    fn next_record(&self) -> Option<&[u8]> {
        let position = self.cursor.get()?;
        let data = self.data.as_bytes();
        if position >= data.len() {
            self.cursor.set(None);
            return None;
        }

        let rest = &data[position..];
        let delimiter = self.record_delimiter.as_bytes();
        let found = if delimiter.is_empty() {
            None
        } else {
            memmem::find(rest, delimiter)
        };
        match found {
            Some(end) => {
                self.cursor.set(Some(position + end + delimiter.len()));
                Some(&rest[..end])
            }
            None => {
                self.cursor.set(Some(data.len()));
                Some(rest)
            }
        }
    }
}

impl Tag for CyclicalTag {
    fn header(&self) -> &TagHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut TagHeader {
        &mut self.header
    }

    fn matches(&self, span: &[u8]) -> bool {
        Shape::Named.matches(&self.header, span)
    }

    fn evaluate(&self, _span: &[u8], _: &mut Registry, out: &mut dyn Write) -> Result<()> {
        match self.next_record() {
            Some(record) => out.write_all(record)?,
            None => {
                tracing::debug!(tag = self.name(), "cyclical tag exhausted");
                out.write_all(CYCLE_EXHAUSTED_MARKER.as_bytes())?;
            }
        }
        Ok(())
    }

    fn has_value(&self) -> bool {
        true
    }

    fn value(&self) -> Option<&str> {
        Some(&self.data)
    }
}

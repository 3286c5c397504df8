//! Reading the highlights export.
//!
//! The export is a comma-separated table with a header record followed by
//! one record per highlight. Every record, the header included, carries
//! exactly [`FIELD_COUNT`] fields:
//!
//! ```text
//! Book Title,Authors,Chapter Title,Date of Highlight,Book URL,Chapter URL,Annotation URL,Highlight,Personal Note
//! ```
//!
//! Quoted fields may span several lines; the newlines are stripped later,
//! when a row becomes a [`Note`](crate::model::Note).
use crate::error::ExportError;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of fields in every record of the export.
pub const FIELD_COUNT: usize = 9;

/// One record of the export, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HighlightRow {
    pub title: String,
    pub authors: String,
    pub chapter: String,
    pub date: String,
    pub book_url: String,
    pub chapter_url: String,
    pub highlight_url: String,
    pub highlight: String,
    pub note: String,
}

impl HighlightRow {
    /// Build a row from a raw record. The field count is checked before
    /// anything is parsed; empty fields are fine.
    pub fn from_record(record: &StringRecord) -> Result<Self, ExportError> {
        check_field_count(record)?;
        Ok(record.deserialize(None)?)
    }
}

fn check_field_count(record: &StringRecord) -> Result<(), ExportError> {
    if record.len() == FIELD_COUNT {
        return Ok(());
    }
    Err(ExportError::MalformedRecord {
        line: record.position().map(|p| p.line()).unwrap_or(0),
        found: record.len(),
    })
}

/// Streams [`HighlightRow`]s out of a CSV source, discarding the header.
pub struct HighlightReader<R> {
    records: StringRecordsIntoIter<R>,
    header_seen: bool,
    rows_read: usize,
}

impl HighlightReader<File> {
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let file = File::open(path).map_err(|e| {
            ExportError::io(format!("Failed to open CSV file: {}", path.display()), e)
        })?;
        Ok(Self::new(file))
    }
}

impl<R: Read> HighlightReader<R> {
    pub fn new(source: R) -> Self {
        // Headers and record lengths are handled here so a short record is
        // reported as malformed rather than as a generic CSV error.
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(source);
        Self {
            records: reader.into_records(),
            header_seen: false,
            rows_read: 0,
        }
    }

    /// Data rows yielded so far (the header is not counted).
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    fn next_record(&mut self) -> Option<Result<StringRecord, ExportError>> {
        self.records.next().map(|r| r.map_err(ExportError::from))
    }
}

impl<R: Read> Iterator for HighlightReader<R> {
    type Item = Result<HighlightRow, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.header_seen {
            self.header_seen = true;
            match self.next_record()? {
                Ok(header) => {
                    if let Err(e) = check_field_count(&header) {
                        return Some(Err(e));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }

        let row = self
            .next_record()?
            .and_then(|record| HighlightRow::from_record(&record));
        if row.is_ok() {
            self.rows_read += 1;
        }
        Some(row)
    }
}

//! CSV report of processed messages.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::WriteError;
use crate::pipeline::OutputRecord;

/// Destination for output records, one row per message.
pub trait RecordSink {
    fn append_row(&mut self, record: &OutputRecord) -> Result<(), WriteError>;

    /// Flush everything written so far.
    fn finish(&mut self) -> Result<(), WriteError>;

    /// Where the rows end up, if they land in a file.
    fn location(&self) -> Option<&Path> {
        None
    }
}

const HEADER: [&str; 4] = ["filename", "summary", "priority", "category"];

/// CSV writer with header `filename,summary,priority,category`.
///
/// The header comes out with the first row, or on `finish` when the batch
/// was empty.
pub struct CsvReport<W: Write> {
    writer: csv::Writer<W>,
    path: Option<PathBuf>,
    rows: usize,
}

impl CsvReport<File> {
    /// Create (truncate) the report file.
    pub fn create(path: &Path) -> Result<Self, WriteError> {
        Ok(Self {
            writer: csv::Writer::from_path(path)?,
            path: Some(path.to_path_buf()),
            rows: 0,
        })
    }
}

impl<W: Write> CsvReport<W> {
    pub fn from_writer(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
            path: None,
            rows: 0,
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, WriteError> {
        self.writer
            .into_inner()
            .map_err(|e| WriteError::Csv(csv::Error::from(e.into_error())))
    }
}

impl<W: Write> RecordSink for CsvReport<W> {
    fn append_row(&mut self, record: &OutputRecord) -> Result<(), WriteError> {
        self.writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), WriteError> {
        if self.rows == 0 {
            self.writer.write_record(HEADER)?;
        }
        self.writer
            .flush()
            .map_err(|e| WriteError::Csv(csv::Error::from(e)))
    }

    fn location(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

//! Run outputs: per-message text artifacts and the CSV report.

pub mod artifacts;
pub mod report;

pub use artifacts::{ArtifactStore, FileArtifactStore};
pub use report::{CsvReport, RecordSink};

//! Digest pipeline.
//!
//! Every fetched message flows through:
//! 1. `ArtifactStore::save_text()` — optional copy of the message on disk
//! 2. `Summarizer::summarize()` — extractive summary
//! 3. `Classifier::classify()` — category and priority keyword rules
//! 4. `RecordSink::append_row()` — one CSV row
//!
//! A message that cannot be processed still produces a row (empty summary,
//! OTHER/NORMAL). Fetch and write failures end the run.

pub mod processor;
pub mod types;

pub use processor::DigestPipeline;
pub use types::{OutputRecord, RunReport};

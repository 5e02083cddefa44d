//! mail-digest — summarize and triage recent email into a CSV report.

pub mod classify;
pub mod config;
pub mod error;
pub mod mailbox;
pub mod output;
pub mod pipeline;
pub mod summarize;
pub mod text;

//! Shared types for the digest pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::classify::{Category, ClassificationResult, Priority};

// ── Output record ───────────────────────────────────────────────────

/// One CSV row. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub filename: String,
    pub summary: String,
    pub priority: Priority,
    pub category: Category,
}

impl OutputRecord {
    pub fn new(
        filename: impl Into<String>,
        summary: impl Into<String>,
        result: ClassificationResult,
    ) -> Self {
        Self {
            filename: filename.into(),
            summary: summary.into(),
            priority: result.priority,
            category: result.category,
        }
    }

    /// Row for a message that could not be processed.
    pub fn fallback(filename: impl Into<String>) -> Self {
        Self::new(filename, "", ClassificationResult::default())
    }
}

// ── Run report ──────────────────────────────────────────────────────

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Rows written.
    pub processed: usize,
    /// Rows that fell back to the default record.
    pub defaulted: usize,
    pub high_priority: usize,
    pub by_category: BTreeMap<Category, usize>,
    /// Report file, when the sink writes to one.
    pub output: Option<PathBuf>,
}

impl RunReport {
    pub fn record(&mut self, record: &OutputRecord, defaulted: bool) {
        self.processed += 1;
        if defaulted {
            self.defaulted += 1;
        }
        if record.priority == Priority::High {
            self.high_priority += 1;
        }
        *self.by_category.entry(record.category).or_insert(0) += 1;
    }

    pub fn count(&self, category: Category) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}

//! Extractive summarization.
//!
//! A summary is built from the message's own sentences:
//! 1. Normalize whitespace and split into sentences
//! 2. Weight each sentence by content-word frequency (`SentenceScorer`)
//! 3. Keep the top `max_sentences` and restore document order
//!
//! Messages with no more sentences than requested are returned whole.

pub mod scorer;

use std::fmt;

use tracing::debug;

use crate::text::{normalize_text, split_sentences};

pub use scorer::{SentenceScore, SentenceScorer, StopWords};

/// Default number of sentences kept in a summary.
pub const DEFAULT_MAX_SENTENCES: usize = 3;

/// Selected sentences in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    sentences: Vec<String>,
}

impl Summary {
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sentences.join(" "))
    }
}

/// Picks the highest-weighted sentences of a message.
#[derive(Debug, Clone)]
pub struct Summarizer {
    scorer: SentenceScorer,
    max_sentences: usize,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(SentenceScorer::default(), DEFAULT_MAX_SENTENCES)
    }
}

impl Summarizer {
    pub fn new(scorer: SentenceScorer, max_sentences: usize) -> Self {
        Self {
            scorer,
            max_sentences,
        }
    }

    pub fn max_sentences(&self) -> usize {
        self.max_sentences
    }

    pub fn summarize(&self, text: &str) -> Summary {
        let normalized = normalize_text(text);
        let sentences = split_sentences(&normalized);

        if sentences.len() <= self.max_sentences {
            return Self::collect(sentences);
        }

        let mut scores = self.scorer.score(&sentences);
        if scores.iter().all(|s| s.weight == 0.0) {
            debug!(
                sentences = sentences.len(),
                "No content words, falling back to leading sentences"
            );
            return Self::collect(sentences.into_iter().take(self.max_sentences));
        }

        // Stable sort: equal weights keep document order.
        scores.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        scores.truncate(self.max_sentences);
        scores.sort_by_key(|s| s.position);

        Self::collect(scores.into_iter().map(|s| s.text))
    }

    fn collect<'a>(sentences: impl IntoIterator<Item = &'a str>) -> Summary {
        Summary {
            sentences: sentences.into_iter().map(String::from).collect(),
        }
    }
}

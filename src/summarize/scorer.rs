//! Token-frequency sentence scoring.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::text::tokenize;

/// Words that carry no topical weight.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "if", "in", "on", "at", "to", "for", "from", "of", "is",
    "are", "was", "were", "be", "been", "am", "it", "that", "this", "with", "as", "by", "about",
    "into", "up", "out", "over", "after", "before", "between", "then", "than", "so", "very", "can",
    "will", "just", "do", "does", "did", "have", "has", "had", "you", "i", "we", "they", "he",
    "she", "them", "his", "her", "our", "your", "their",
];

/// Stop-word set excluded from the frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopWords(HashSet<String>);

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        )
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_WORDS)
    }
}

/// A sentence with its position in the message and its importance weight.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceScore<'a> {
    pub text: &'a str,
    pub position: usize,
    pub weight: f64,
}

/// Scores sentences by the relative frequency of their content words.
#[derive(Debug, Clone, Default)]
pub struct SentenceScorer {
    stop_words: StopWords,
    length_normalized: bool,
}

impl SentenceScorer {
    pub fn new(stop_words: StopWords, length_normalized: bool) -> Self {
        Self {
            stop_words,
            length_normalized,
        }
    }

    /// Token frequencies across all sentences, scaled so the most frequent
    /// content word is 1.0. Empty when the message has no content words.
    pub fn frequency_table(&self, sentences: &[&str]) -> HashMap<String, f64> {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for sentence in sentences {
            for token in tokenize(sentence) {
                if !self.stop_words.contains(&token) {
                    *counts.entry(token).or_insert(0) += 1;
                }
            }
        }

        let Some(max) = counts.values().copied().max() else {
            return HashMap::new();
        };
        let max = f64::from(max);

        counts
            .into_iter()
            .map(|(token, count)| (token, f64::from(count) / max))
            .collect()
    }

    /// Score every sentence against the message-wide frequency table.
    ///
    /// Returned in document order; `position` is the sentence index.
    pub fn score<'a>(&self, sentences: &[&'a str]) -> Vec<SentenceScore<'a>> {
        let freq = self.frequency_table(sentences);

        sentences
            .iter()
            .enumerate()
            .map(|(position, text)| {
                let tokens = tokenize(text);
                let total: f64 = tokens
                    .iter()
                    .map(|t| freq.get(t).copied().unwrap_or(0.0))
                    .sum();
                let weight = if self.length_normalized && !tokens.is_empty() {
                    total / tokens.len() as f64
                } else {
                    total
                };
                SentenceScore {
                    text,
                    position,
                    weight,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stop_words_loaded() {
        let stop = StopWords::default();
        assert_eq!(stop.len(), DEFAULT_STOP_WORDS.len());
        assert!(stop.contains("the"));
        assert!(!stop.contains("invoice"));
    }

    #[test]
    fn custom_stop_words_are_lowercased() {
        let stop = StopWords::new(["Hello", "WORLD"]);
        assert!(stop.contains("hello"));
        assert!(stop.contains("world"));
    }

    #[test]
    fn frequency_table_excludes_stop_words_and_scales_to_max() {
        let scorer = SentenceScorer::default();
        let freq = scorer.frequency_table(&["The invoice is due.", "Pay the invoice today."]);

        assert!(!freq.contains_key("the"));
        assert!(!freq.contains_key("is"));
        assert_eq!(freq["invoice"], 1.0);
        assert_eq!(freq["due"], 0.5);
        assert_eq!(freq["today"], 0.5);
    }

    #[test]
    fn frequency_table_empty_when_only_stop_words() {
        let scorer = SentenceScorer::default();
        assert!(scorer.frequency_table(&["It is what it is."]).is_empty());
        assert!(scorer.frequency_table(&[]).is_empty());
    }

    #[test]
    fn score_sums_token_frequencies() {
        let scorer = SentenceScorer::default();
        let scores = scorer.score(&["Budget budget review.", "Lunch.", "Budget plan."]);

        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0].position, 0);
        // budget = 3/3, review = 1/3
        assert!((scores[0].weight - (1.0 + 1.0 + 1.0 / 3.0)).abs() < 1e-9);
        assert!((scores[1].weight - 1.0 / 3.0).abs() < 1e-9);
        assert!((scores[2].weight - (1.0 + 1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn length_normalization_divides_by_token_count() {
        let scorer = SentenceScorer::new(StopWords::default(), true);
        let scores = scorer.score(&["Budget budget review.", "Budget."]);

        // budget = 3/3, review = 1/3
        assert!((scores[0].weight - (1.0 + 1.0 + 1.0 / 3.0) / 3.0).abs() < 1e-9);
        assert!((scores[1].weight - 1.0).abs() < 1e-9);
        assert!(scores[1].weight > scores[0].weight);
    }

    #[test]
    fn sentence_without_tokens_scores_zero() {
        let scorer = SentenceScorer::new(StopWords::default(), true);
        let scores = scorer.score(&["Report ready.", "!!!"]);
        assert_eq!(scores[1].weight, 0.0);
    }
}

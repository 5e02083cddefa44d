//! Keyword rules engine.
//!
//! Matching is case-insensitive substring search, so multi-word phrases
//! ("call me", "limited time") work as keywords. Rules are evaluated in
//! configured order; overlapping keywords are resolved by that order only.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{Category, ClassificationResult, Priority};
use crate::error::ConfigError;

const BUSINESS_KEYWORDS: &[&str] = &[
    "client", "project", "meeting", "contract", "invoice", "payment", "report", "proposal",
    "deadline",
];

const PERSONAL_KEYWORDS: &[&str] = &[
    "friend", "family", "birthday", "party", "hangout", "dinner", "call me", "see you", "miss you",
];

const PROMOTION_KEYWORDS: &[&str] = &[
    "discount", "offer", "sale", "promotion", "coupon", "deal", "subscribe", "newsletter",
    "limited time",
];

const URGENCY_KEYWORDS: &[&str] = &[
    "urgent", "immediately", "asap", "deadline", "failed", "error", "issue", "critical",
    "important", "payment", "invoice", "meeting", "schedule", "client", "project",
];

/// One category rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Keyword tables for a run. Loaded from JSON or built from the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Evaluated top to bottom; the first rule with a matching keyword wins.
    pub category_rules: Vec<CategoryRule>,
    pub urgency_keywords: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            category_rules: vec![
                CategoryRule::new(Category::Business, BUSINESS_KEYWORDS),
                CategoryRule::new(Category::Personal, PERSONAL_KEYWORDS),
                CategoryRule::new(Category::Promotion, PROMOTION_KEYWORDS),
            ],
            urgency_keywords: URGENCY_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl RulesConfig {
    /// Parse a rules file:
    /// `{"category_rules": [{"category": "BUSINESS", "keywords": [...]}], "urgency_keywords": [...]}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw).map_err(|e| ConfigError::Rules {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Lower-cased keywords matched as substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// First keyword found in `lowered`, which must already be lower-case.
    pub fn find_in(&self, lowered: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| lowered.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Deterministic category/priority classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    category_rules: Vec<(Category, KeywordSet)>,
    urgency: KeywordSet,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&RulesConfig::default())
    }
}

impl Classifier {
    pub fn new(config: &RulesConfig) -> Self {
        Self {
            category_rules: config
                .category_rules
                .iter()
                .map(|rule| (rule.category, KeywordSet::new(&rule.keywords)))
                .collect(),
            urgency: KeywordSet::new(&config.urgency_keywords),
        }
    }

    /// A classifier with no rules: everything is OTHER/NORMAL.
    pub fn empty() -> Self {
        Self {
            category_rules: Vec::new(),
            urgency: KeywordSet::default(),
        }
    }

    /// Append a category rule after the existing ones.
    pub fn add_category_rule(&mut self, category: Category, keywords: &[&str]) {
        self.category_rules
            .push((category, KeywordSet::new(keywords)));
    }

    pub fn rule_count(&self) -> usize {
        self.category_rules.len()
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        let lowered = text.to_lowercase();
        ClassificationResult {
            category: self.category_of(&lowered),
            priority: self.priority_of(&lowered),
        }
    }

    fn category_of(&self, lowered: &str) -> Category {
        for (category, keywords) in &self.category_rules {
            if let Some(keyword) = keywords.find_in(lowered) {
                debug!(%category, keyword, "Matched category rule");
                return *category;
            }
        }
        Category::Other
    }

    fn priority_of(&self, lowered: &str) -> Priority {
        match self.urgency.find_in(lowered) {
            Some(keyword) => {
                debug!(keyword, "Matched urgency keyword");
                Priority::High
            }
            None => Priority::Normal,
        }
    }
}

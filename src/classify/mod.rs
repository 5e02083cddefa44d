//! Keyword-rule classification of message text.
//!
//! Two independent passes run over the lower-cased text:
//! - category: ordered `(category, keywords)` rules, first match wins
//! - priority: any urgency keyword marks the message HIGH

pub mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use rules::{CategoryRule, Classifier, KeywordSet, RulesConfig};

/// What a message is about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Business,
    Personal,
    Promotion,
    #[default]
    Other,
}

impl Category {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "BUSINESS",
            Self::Personal => "PERSONAL",
            Self::Promotion => "PROMOTION",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency flag, independent of category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    #[default]
    Normal,
}

impl Priority {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Normal => "NORMAL",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category and priority assigned to one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub priority: Priority,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_other_normal() {
        let result = ClassificationResult::default();
        assert_eq!(result.category, Category::Other);
        assert_eq!(result.priority, Priority::Normal);
    }

    #[test]
    fn labels_are_uppercase() {
        assert_eq!(Category::Promotion.to_string(), "PROMOTION");
        assert_eq!(Priority::High.to_string(), "HIGH");
    }

    #[test]
    fn serde_uses_uppercase_labels() {
        let json = serde_json::to_string(&Category::Business).unwrap();
        assert_eq!(json, "\"BUSINESS\"");
        let parsed: Priority = serde_json::from_str("\"NORMAL\"").unwrap();
        assert_eq!(parsed, Priority::Normal);
    }
}

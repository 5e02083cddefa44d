//! Mailbox abstraction: where messages come from.
//!
//! A run calls `Mailbox::fetch_recent` once. Connection details (login,
//! folder selection) belong to the implementation.

pub mod folder;
pub mod imap;
pub mod parse;

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::FetchError;

pub use folder::FolderMailbox;
pub use imap::{ImapMailbox, ImapSession};

/// Maximum length of the subject part of a generated identifier.
const SAFE_NAME_MAX_CHARS: usize = 50;

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\- ]").expect("name regex is valid"));

/// A fetched message. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Stable name for this message; also the artifact and CSV file name.
    pub identifier: String,
    pub sender: Option<String>,
    pub subject: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
    /// Decoded plain-text body.
    pub body: String,
    /// Set by the mailbox when the message could not be decoded.
    pub defect: Option<String>,
}

impl Message {
    pub fn new(identifier: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            sender: None,
            subject: None,
            received_at: None,
            body: body.into(),
            defect: None,
        }
    }

    /// A message whose content could not be decoded.
    pub fn malformed(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            defect: Some(reason.into()),
            ..Self::new(identifier, "")
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = Some(received_at);
        self
    }

    /// Standalone text form: `From`/`Subject` headers, blank line, body.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if let Some(sender) = &self.sender {
            out.push_str(&format!("From: {sender}\n"));
        }
        if let Some(subject) = &self.subject {
            out.push_str(&format!("Subject: {subject}\n"));
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.body);
        out
    }
}

/// Source of messages for a run.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch up to `limit` of the most recent messages, oldest first.
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Message>, FetchError>;
}

/// Replace characters unsafe in file names with `_` and cap the length.
pub fn safe_filename(text: &str) -> String {
    UNSAFE_NAME_CHARS
        .replace_all(text, "_")
        .chars()
        .take(SAFE_NAME_MAX_CHARS)
        .collect()
}

/// Keep the last `limit` items of `items`.
pub(crate) fn keep_last<T>(mut items: Vec<T>, limit: usize) -> Vec<T> {
    let skip = items.len().saturating_sub(limit);
    items.drain(..skip);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_filename_replaces_unsafe_chars() {
        assert_eq!(safe_filename("Re: Q3/Q4 plan?"), "Re_ Q3_Q4 plan_");
        assert_eq!(safe_filename("ok-name_1"), "ok-name_1");
    }

    #[test]
    fn safe_filename_truncates() {
        let long = "x".repeat(80);
        assert_eq!(safe_filename(&long).len(), 50);
    }

    #[test]
    fn safe_filename_non_ascii() {
        assert_eq!(safe_filename("Café"), "Caf_");
    }

    #[test]
    fn render_text_with_headers() {
        let msg = Message::new("a.txt", "Body here.")
            .with_sender("alice@example.com")
            .with_subject("Hello");
        assert_eq!(
            msg.render_text(),
            "From: alice@example.com\nSubject: Hello\n\nBody here."
        );
    }

    #[test]
    fn render_text_without_headers() {
        assert_eq!(Message::new("a.txt", "Just body").render_text(), "Just body");
    }

    #[test]
    fn malformed_message_has_defect_and_empty_body() {
        let msg = Message::malformed("bad.txt", "unparseable");
        assert_eq!(msg.defect.as_deref(), Some("unparseable"));
        assert!(msg.body.is_empty());
    }

    #[test]
    fn keep_last_trims_front() {
        assert_eq!(keep_last(vec![1, 2, 3, 4], 2), vec![3, 4]);
        assert_eq!(keep_last(vec![1, 2], 5), vec![1, 2]);
        assert!(keep_last(vec![1, 2], 0).is_empty());
    }
}

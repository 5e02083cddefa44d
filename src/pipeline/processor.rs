//! Digest pipeline — turns fetched messages into output records.

use tracing::{debug, info, warn};

use crate::classify::Classifier;
use crate::config::DigestConfig;
use crate::error::{MessageError, Result};
use crate::mailbox::{Mailbox, Message};
use crate::output::{ArtifactStore, RecordSink};
use crate::pipeline::types::{OutputRecord, RunReport};
use crate::summarize::{SentenceScorer, StopWords, Summarizer};
use crate::text::normalize_text;

/// Summarizer + classifier, configured once per run.
#[derive(Debug, Clone, Default)]
pub struct DigestPipeline {
    summarizer: Summarizer,
    classifier: Classifier,
}

impl DigestPipeline {
    pub fn new(summarizer: Summarizer, classifier: Classifier) -> Self {
        Self {
            summarizer,
            classifier,
        }
    }

    pub fn from_config(config: &DigestConfig) -> Self {
        let scorer = SentenceScorer::new(StopWords::default(), config.length_normalized);
        Self::new(
            Summarizer::new(scorer, config.max_sentences),
            Classifier::new(&config.rules),
        )
    }

    /// Summarize and classify one message.
    pub fn process(&self, message: &Message) -> std::result::Result<OutputRecord, MessageError> {
        if let Some(reason) = &message.defect {
            return Err(MessageError::MalformedBody {
                id: message.identifier.clone(),
                reason: reason.clone(),
            });
        }
        if message.body.contains('\0') {
            return Err(MessageError::MalformedBody {
                id: message.identifier.clone(),
                reason: "body contains NUL bytes".into(),
            });
        }

        let text = normalize_text(&message.body);
        let summary = self.summarizer.summarize(&text);
        let result = self.classifier.classify(&text);
        debug!(
            id = %message.identifier,
            sentences = summary.len(),
            category = %result.category,
            priority = %result.priority,
            "Message processed"
        );
        Ok(OutputRecord::new(
            &message.identifier,
            summary.to_string(),
            result,
        ))
    }

    /// Like `process`, but a failure yields the default record.
    ///
    /// The flag is `true` when the default was used.
    pub fn process_or_default(&self, message: &Message) -> (OutputRecord, bool) {
        match self.process(message) {
            Ok(record) => (record, false),
            Err(e) => {
                warn!(id = %message.identifier, error = %e, "Using default record");
                (OutputRecord::fallback(&message.identifier), true)
            }
        }
    }

    /// Fetch up to `limit` messages and write one record per message.
    ///
    /// When `artifacts` is given, each message's text is saved before it is
    /// processed. Fetch and write errors abort the run.
    pub async fn run(
        &self,
        mailbox: &dyn Mailbox,
        limit: usize,
        artifacts: Option<&dyn ArtifactStore>,
        sink: &mut dyn RecordSink,
    ) -> Result<RunReport> {
        let messages = mailbox.fetch_recent(limit).await?;
        info!(
            mailbox = mailbox.name(),
            count = messages.len(),
            "Fetched messages"
        );

        let mut report = RunReport::default();
        for message in &messages {
            if let Some(store) = artifacts {
                store
                    .save_text(&message.identifier, &message.render_text())
                    .await?;
            }

            let (record, defaulted) = self.process_or_default(message);
            sink.append_row(&record)?;
            report.record(&record, defaulted);
        }
        sink.finish()?;
        report.output = sink.location().map(|p| p.to_path_buf());

        info!(
            processed = report.processed,
            defaulted = report.defaulted,
            high_priority = report.high_priority,
            by_category = ?report.by_category,
            output = ?report.output,
            "Digest run complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Category, Priority};

    #[test]
    fn invoice_scenario() {
        let msg = Message::new(
            "inv.txt",
            "Please review the attached invoice. This is urgent, send it asap.",
        );
        let record = DigestPipeline::default().process(&msg).unwrap();

        assert_eq!(record.filename, "inv.txt");
        assert_eq!(record.category, Category::Business);
        assert_eq!(record.priority, Priority::High);
        assert_eq!(
            record.summary,
            "Please review the attached invoice. This is urgent, send it asap."
        );
    }

    #[test]
    fn empty_body_scenario() {
        let record = DigestPipeline::default()
            .process(&Message::new("empty.txt", ""))
            .unwrap();
        assert_eq!(record, OutputRecord::fallback("empty.txt"));
    }

    #[test]
    fn promotion_scenario() {
        let msg = Message::new("promo.txt", "Huge discount on all items this weekend only!");
        let record = DigestPipeline::default().process(&msg).unwrap();
        assert_eq!(record.category, Category::Promotion);
        assert_eq!(record.priority, Priority::Normal);
    }

    #[test]
    fn defect_is_message_error() {
        let msg = Message::malformed("bad.txt", "unparseable");
        assert!(matches!(
            DigestPipeline::default().process(&msg),
            Err(MessageError::MalformedBody { .. })
        ));
    }

    #[test]
    fn nul_bytes_fall_back_to_default() {
        let msg = Message::new("bin.txt", "urgent invoice\0\0\0");
        let (record, defaulted) = DigestPipeline::default().process_or_default(&msg);
        assert!(defaulted);
        assert_eq!(record, OutputRecord::fallback("bin.txt"));
    }

    #[test]
    fn phrase_keyword_wrapped_across_lines_still_matches() {
        let msg = Message::new("p.txt", "Are you free tonight?\nCall\nme when you can.");
        let record = DigestPipeline::default().process(&msg).unwrap();
        assert_eq!(record.category, Category::Personal);
        assert_eq!(record.summary, "Are you free tonight? Call me when you can.");
    }

    #[test]
    fn promotion_phrase_split_by_newline_and_tab() {
        let msg = Message::new("s.txt", "Shop now. Limited\n\ttime only.");
        let record = DigestPipeline::default().process(&msg).unwrap();
        assert_eq!(record.category, Category::Promotion);
        assert_eq!(record.priority, Priority::Normal);
    }

    #[test]
    fn config_controls_summary_length() {
        let config = DigestConfig {
            max_sentences: 1,
            ..DigestConfig::default()
        };
        let msg = Message::new("m.txt", "Report due. Lunch? Report report soon.");
        let record = DigestPipeline::from_config(&config).process(&msg).unwrap();
        assert_eq!(record.summary, "Report report soon.");
    }
}

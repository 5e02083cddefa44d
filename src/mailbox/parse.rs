//! RFC 822 message decoding via `mail-parser`.

use mail_parser::{MessageParser, MimeHeaders};

use crate::mailbox::{Message, safe_filename};
use crate::text::strip_html;

/// Decode a raw RFC 822 message fetched under sequence number `seq`.
///
/// Undecodable input still yields a `Message`, carrying a defect, so the
/// pipeline can emit a default record for it.
pub fn parse_rfc822(raw: &[u8], seq: u32) -> Message {
    let Some(parsed) = MessageParser::default().parse(raw) else {
        return Message::malformed(format!("_{seq}.txt"), "unparseable RFC 822 message");
    };

    let subject = parsed.subject().unwrap_or_default().to_string();
    let identifier = format!("{}_{seq}.txt", safe_filename(&subject));

    let mut message = Message::new(identifier, extract_text(&parsed))
        .with_sender(extract_sender(&parsed))
        .with_subject(subject);
    if let Some(ts) = parsed
        .date()
        .and_then(|d| chrono::DateTime::from_timestamp(d.to_timestamp(), 0))
    {
        message = message.with_received_at(ts);
    }
    message
}

/// Extract the sender address from a parsed email.
fn extract_sender(parsed: &mail_parser::Message) -> String {
    parsed
        .from()
        .and_then(|addr| addr.first())
        .and_then(|a| a.address())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Extract readable text: first `text/plain` body, then stripped HTML,
/// then any textual attachment. Empty if none exists.
fn extract_text(parsed: &mail_parser::Message) -> String {
    if let Some(text) = parsed.body_text(0) {
        return text.to_string();
    }
    if let Some(html) = parsed.body_html(0) {
        return strip_html(html.as_ref());
    }
    for part in parsed.attachments() {
        let part: &mail_parser::MessagePart = part;
        if let Some(ct) = MimeHeaders::content_type(part)
            && ct.ctype() == "text"
            && let Ok(text) = std::str::from_utf8(part.contents())
        {
            return text.to_string();
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = "From: Alice <alice@example.com>\r\n\
        To: bob@example.com\r\n\
        Subject: Q3 invoice?\r\n\
        Date: Tue, 1 Jul 2025 10:00:00 +0000\r\n\
        Content-Type: text/plain; charset=utf-8\r\n\
        \r\n\
        Please pay the invoice.\r\n";

    #[test]
    fn parses_plain_message() {
        let msg = parse_rfc822(PLAIN.as_bytes(), 7);

        assert_eq!(msg.identifier, "Q3 invoice__7.txt");
        assert_eq!(msg.sender.as_deref(), Some("alice@example.com"));
        assert_eq!(msg.subject.as_deref(), Some("Q3 invoice?"));
        assert!(msg.body.contains("Please pay the invoice."));
        assert!(msg.defect.is_none());
        assert_eq!(
            msg.received_at.map(|d| d.timestamp()),
            Some(1_751_364_000)
        );
    }

    #[test]
    fn prefers_plain_part_of_alternative() {
        let raw = "From: a@example.com\r\n\
            Subject: Mixed\r\n\
            MIME-Version: 1.0\r\n\
            Content-Type: multipart/alternative; boundary=\"b1\"\r\n\
            \r\n\
            --b1\r\n\
            Content-Type: text/plain\r\n\
            \r\n\
            Plain version.\r\n\
            --b1\r\n\
            Content-Type: text/html\r\n\
            \r\n\
            <p>HTML version.</p>\r\n\
            --b1--\r\n";
        let msg = parse_rfc822(raw.as_bytes(), 1);
        assert!(msg.body.contains("Plain version."));
        assert!(!msg.body.contains("<p>"));
    }

    #[test]
    fn falls_back_to_stripped_html() {
        let raw = "From: a@example.com\r\n\
            Subject: Html only\r\n\
            Content-Type: text/html\r\n\
            \r\n\
            <html><body><p>Big sale today.</p></body></html>\r\n";
        let msg = parse_rfc822(raw.as_bytes(), 2);
        assert!(msg.body.contains("Big sale today."));
        assert!(!msg.body.contains("<p>"));
    }

    #[test]
    fn missing_subject_uses_sequence_only() {
        let raw = "From: a@example.com\r\n\r\nHello.\r\n";
        let msg = parse_rfc822(raw.as_bytes(), 3);
        assert_eq!(msg.identifier, "_3.txt");
    }
}

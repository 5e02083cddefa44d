//! IMAP mailbox — one-shot TLS session: login, select, search, fetch, logout.
//!
//! The exchange is blocking and runs on a `spawn_blocking` worker.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use crate::config::MailboxConfig;
use crate::error::FetchError;
use crate::mailbox::parse::parse_rfc822;
use crate::mailbox::{Mailbox, Message, keep_last};

const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Server response to one tagged command.
#[derive(Debug, Default)]
pub struct Response {
    /// Untagged and continuation lines, CRLF stripped.
    pub lines: Vec<String>,
    /// Literal payloads (`{N}` blocks) in the order they arrived.
    pub literals: Vec<Vec<u8>>,
    /// The tagged completion line, tag removed (e.g. `OK FETCH completed`).
    pub status: String,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        self.status.starts_with("OK")
    }
}

/// Minimal IMAP4rev1 client over any byte stream.
pub struct ImapSession<S: Read + Write> {
    stream: S,
    next_tag: u32,
}

impl<S: Read + Write> ImapSession<S> {
    /// Wrap a connected stream and consume the server greeting.
    pub fn start(stream: S) -> Result<Self, FetchError> {
        let mut session = Self {
            stream,
            next_tag: 1,
        };
        let greeting = session.read_line()?;
        if !greeting.starts_with("* OK") && !greeting.starts_with("* PREAUTH") {
            return Err(FetchError::Protocol(format!(
                "unexpected greeting: {}",
                greeting.trim_end()
            )));
        }
        Ok(session)
    }

    pub fn login(&mut self, user: &str, password: &str) -> Result<(), FetchError> {
        let cmd = format!("LOGIN {} {}", quote(user), quote(password));
        let resp = self.send(&cmd)?;
        if !resp.is_ok() {
            return Err(FetchError::AuthFailed {
                user: user.to_string(),
            });
        }
        Ok(())
    }

    /// Select a folder and return its message count.
    pub fn select(&mut self, folder: &str) -> Result<u32, FetchError> {
        let resp = self.expect_ok("SELECT", &format!("SELECT {}", quote(folder)))?;
        let exists = resp
            .lines
            .iter()
            .find_map(|line| {
                let rest = line.strip_prefix("* ")?;
                let (count, word) = rest.split_once(' ')?;
                (word.trim() == "EXISTS").then(|| count.parse().ok())?
            })
            .unwrap_or(0);
        Ok(exists)
    }

    /// Sequence numbers of every message in the selected folder.
    pub fn search_all(&mut self) -> Result<Vec<u32>, FetchError> {
        let resp = self.expect_ok("SEARCH", "SEARCH ALL")?;
        let mut seqs = Vec::new();
        for line in &resp.lines {
            if let Some(rest) = line.strip_prefix("* SEARCH") {
                seqs.extend(rest.split_whitespace().filter_map(|n| n.parse::<u32>().ok()));
            }
        }
        Ok(seqs)
    }

    /// Raw RFC 822 bytes of message `seq`.
    pub fn fetch_rfc822(&mut self, seq: u32) -> Result<Vec<u8>, FetchError> {
        let mut resp = self.expect_ok("FETCH", &format!("FETCH {seq} RFC822"))?;
        if resp.literals.is_empty() {
            return Err(FetchError::Protocol(format!(
                "FETCH {seq} returned no message literal"
            )));
        }
        Ok(resp.literals.swap_remove(0))
    }

    pub fn logout(&mut self) -> Result<(), FetchError> {
        self.send("LOGOUT").map(|_| ())
    }

    /// Consume the session, returning the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    fn expect_ok(&mut self, command: &str, line: &str) -> Result<Response, FetchError> {
        let resp = self.send(line)?;
        if !resp.is_ok() {
            return Err(FetchError::Command {
                command: command.to_string(),
                response: resp.status,
            });
        }
        Ok(resp)
    }

    /// Send a tagged command and collect everything up to its completion.
    fn send(&mut self, command: &str) -> Result<Response, FetchError> {
        let tag = format!("A{}", self.next_tag);
        self.next_tag += 1;

        self.stream
            .write_all(format!("{tag} {command}\r\n").as_bytes())?;
        self.stream.flush()?;

        let tag_prefix = format!("{tag} ");
        let mut resp = Response::default();
        loop {
            let line = self.read_line()?;
            if let Some(status) = line.strip_prefix(&tag_prefix) {
                resp.status = status.trim_end().to_string();
                return Ok(resp);
            }
            if let Some(len) = literal_len(&line) {
                resp.literals.push(self.read_exact(len)?);
            }
            resp.lines.push(line.trim_end().to_string());
        }
    }

    fn read_line(&mut self) -> Result<String, FetchError> {
        let mut buf = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            match self.stream.read(&mut byte)? {
                0 => return Err(FetchError::ConnectionClosed),
                _ => {
                    buf.push(byte[0]);
                    if buf.ends_with(b"\r\n") {
                        return Ok(String::from_utf8_lossy(&buf).into_owned());
                    }
                }
            }
        }
    }

    fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, FetchError> {
        let mut buf = vec![0u8; len];
        self.stream.read_exact(&mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                FetchError::ConnectionClosed
            } else {
                FetchError::Io(e)
            }
        })?;
        Ok(buf)
    }
}

/// Length of a trailing `{N}` literal marker, if the line ends with one.
fn literal_len(line: &str) -> Option<usize> {
    let line = line.trim_end();
    let inner = line.strip_suffix('}')?;
    let open = inner.rfind('{')?;
    inner[open + 1..].parse().ok()
}

/// IMAP quoted string.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// IMAP-over-TLS mailbox.
pub struct ImapMailbox {
    config: MailboxConfig,
}

impl ImapMailbox {
    pub fn new(config: MailboxConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailbox for ImapMailbox {
    fn name(&self) -> &str {
        "imap"
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Message>, FetchError> {
        info!(
            host = %self.config.imap_host,
            folder = %self.config.folder,
            limit,
            "Fetching recent messages"
        );
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || fetch_recent_blocking(&config, limit))
            .await
            .map_err(|e| FetchError::Task(e.to_string()))?
    }
}

/// Connect, authenticate and fetch the last `limit` messages.
fn fetch_recent_blocking(config: &MailboxConfig, limit: usize) -> Result<Vec<Message>, FetchError> {
    let stream = connect_tls(config)?;
    let mut session = ImapSession::start(stream)?;
    session.login(&config.username, config.password.expose_secret())?;
    let messages = fetch_from_session(&mut session, &config.folder, limit)?;
    if let Err(e) = session.logout() {
        warn!(error = %e, "IMAP logout failed");
    }
    Ok(messages)
}

/// Select `folder` and fetch its last `limit` messages over an
/// authenticated session.
pub fn fetch_from_session<S: Read + Write>(
    session: &mut ImapSession<S>,
    folder: &str,
    limit: usize,
) -> Result<Vec<Message>, FetchError> {
    let exists = session.select(folder)?;
    let seqs = keep_last(session.search_all()?, limit);
    debug!(exists, selected = seqs.len(), "Searched folder");

    let mut messages = Vec::with_capacity(seqs.len());
    for seq in seqs {
        let raw = session.fetch_rfc822(seq)?;
        let message = parse_rfc822(&raw, seq);
        debug!(seq, identifier = %message.identifier, bytes = raw.len(), "Fetched message");
        messages.push(message);
    }
    Ok(messages)
}

type TlsStream = rustls::StreamOwned<rustls::ClientConnection, TcpStream>;

fn connect_tls(config: &MailboxConfig) -> Result<TlsStream, FetchError> {
    let connect_err = |reason: String| FetchError::Connect {
        host: config.imap_host.clone(),
        port: config.imap_port,
        reason,
    };

    let tcp = TcpStream::connect((config.imap_host.as_str(), config.imap_port))
        .map_err(|e| connect_err(e.to_string()))?;
    tcp.set_read_timeout(Some(READ_TIMEOUT))?;

    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = Arc::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth(),
    );
    let server_name = rustls_pki_types::ServerName::try_from(config.imap_host.clone())
        .map_err(|e| FetchError::Tls(e.to_string()))?;
    let conn = rustls::ClientConnection::new(tls_config, server_name)
        .map_err(|e| FetchError::Tls(e.to_string()))?;

    Ok(rustls::StreamOwned::new(conn, tcp))
}

//! Error types for mail-digest.

use std::path::PathBuf;

/// Top-level error type for a digest run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse rules file {path}: {reason}")]
    Rules { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Mailbox retrieval errors. Always fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to connect to {host}:{port}: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Authentication failed for {user}")]
    AuthFailed { user: String },

    #[error("IMAP command {command} failed: {response}")]
    Command { command: String, response: String },

    #[error("IMAP protocol error: {0}")]
    Protocol(String),

    #[error("Mailbox connection closed unexpectedly")]
    ConnectionClosed,

    #[error("Cannot read folder {path}: {source}")]
    Folder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fetch task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to process one message. Recovered locally by the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Message {id} has a malformed body: {reason}")]
    MalformedBody { id: String, reason: String },
}

/// Artifact and report write errors. Fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact name: {0:?}")]
    InvalidName(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for a digest run.
pub type Result<T> = std::result::Result<T, Error>;

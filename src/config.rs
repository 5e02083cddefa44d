//! Configuration types, built from environment variables.
//!
//! A `.env` file in the working directory is loaded by the binary before
//! any of these are read. CLI flags override what is read here.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;

use crate::classify::RulesConfig;
use crate::error::ConfigError;
use crate::summarize::DEFAULT_MAX_SENTENCES;

pub const DEFAULT_IMAP_HOST: &str = "imap.gmail.com";
pub const DEFAULT_IMAP_PORT: u16 = 993;
pub const DEFAULT_FOLDER: &str = "INBOX";
pub const DEFAULT_MAX_MESSAGES: usize = 20;
pub const DEFAULT_ARTIFACT_DIR: &str = "emails";
pub const DEFAULT_CSV_PATH: &str = "email_summaries.csv";

/// Read an optional variable and parse it, falling back to `default`.
fn env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })
        }
        _ => Ok(default),
    }
}

fn env_required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

// ── Mailbox ─────────────────────────────────────────────────────────

/// IMAP connection settings.
#[derive(Debug, Clone)]
pub struct MailboxConfig {
    pub imap_host: String,
    pub imap_port: u16,
    pub username: String,
    pub password: SecretString,
    pub folder: String,
    pub max_messages: usize,
}

impl MailboxConfig {
    /// Requires `EMAIL_ACCOUNT` and `EMAIL_PASSWORD`; everything else has
    /// a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            imap_host: env_or("EMAIL_IMAP_HOST", DEFAULT_IMAP_HOST.to_string())?,
            imap_port: env_or("EMAIL_IMAP_PORT", DEFAULT_IMAP_PORT)?,
            username: env_required("EMAIL_ACCOUNT")?,
            password: SecretString::from(env_required("EMAIL_PASSWORD")?),
            folder: env_or("EMAIL_FOLDER", DEFAULT_FOLDER.to_string())?,
            max_messages: env_or("EMAIL_MAX_MESSAGES", DEFAULT_MAX_MESSAGES)?,
        })
    }
}

// ── Digest ──────────────────────────────────────────────────────────

/// Summarization and classification settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestConfig {
    pub max_sentences: usize,
    /// Divide sentence weights by their token count.
    pub length_normalized: bool,
    pub rules: RulesConfig,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            max_sentences: DEFAULT_MAX_SENTENCES,
            length_normalized: false,
            rules: RulesConfig::default(),
        }
    }
}

impl DigestConfig {
    /// `DIGEST_MAX_SENTENCES`, `DIGEST_LENGTH_NORMALIZED`, and
    /// `DIGEST_RULES_FILE` (JSON keyword rules; built-in rules if unset).
    ///
    /// `rules_file` takes precedence over `DIGEST_RULES_FILE`, which is then
    /// never read.
    pub fn from_env(rules_file: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self {
            max_sentences: env_or("DIGEST_MAX_SENTENCES", DEFAULT_MAX_SENTENCES)?,
            length_normalized: env_or("DIGEST_LENGTH_NORMALIZED", false)?,
            rules: load_rules(rules_file, "DIGEST_RULES_FILE")?,
        })
    }
}

fn load_rules(rules_file: Option<&Path>, env_key: &str) -> Result<RulesConfig, ConfigError> {
    if let Some(path) = rules_file {
        return RulesConfig::load(path);
    }
    match std::env::var(env_key) {
        Ok(path) if !path.is_empty() => RulesConfig::load(Path::new(&path)),
        _ => Ok(RulesConfig::default()),
    }
}

// ── Output ──────────────────────────────────────────────────────────

/// Where artifacts and the report go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub artifact_dir: PathBuf,
    pub csv_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
        }
    }
}

impl OutputConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            artifact_dir: env_or("DIGEST_OUTPUT_DIR", PathBuf::from(DEFAULT_ARTIFACT_DIR))?,
            csv_path: env_or("DIGEST_OUTPUT_CSV", PathBuf::from(DEFAULT_CSV_PATH))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // SAFETY (all env tests): each test uses variable names no other test
    // touches, so concurrent test threads never race on them.

    #[test]
    fn env_or_falls_back_when_unset() {
        unsafe { std::env::remove_var("MAIL_DIGEST_TEST_UNSET") };
        assert_eq!(env_or("MAIL_DIGEST_TEST_UNSET", 7usize).unwrap(), 7);
    }

    #[test]
    fn env_or_parses_value() {
        unsafe { std::env::set_var("MAIL_DIGEST_TEST_PORT", " 143 ") };
        assert_eq!(env_or("MAIL_DIGEST_TEST_PORT", 993u16).unwrap(), 143);
    }

    #[test]
    fn env_or_rejects_garbage() {
        unsafe { std::env::set_var("MAIL_DIGEST_TEST_BAD", "lots") };
        match env_or("MAIL_DIGEST_TEST_BAD", 3usize) {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "MAIL_DIGEST_TEST_BAD"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn env_required_reports_missing_key() {
        unsafe { std::env::remove_var("MAIL_DIGEST_TEST_REQUIRED") };
        match env_required("MAIL_DIGEST_TEST_REQUIRED") {
            Err(ConfigError::MissingEnvVar(key)) => assert_eq!(key, "MAIL_DIGEST_TEST_REQUIRED"),
            other => panic!("Expected MissingEnvVar, got {:?}", other),
        }
    }

    #[test]
    fn explicit_rules_file_skips_broken_env_file() {
        unsafe { std::env::set_var("MAIL_DIGEST_TEST_RULES", "/nonexistent/rules.json") };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"{"category_rules":[{"category":"PROMOTION","keywords":["sale"]}],"urgency_keywords":[]}"#,
        )
        .unwrap();

        let rules = load_rules(Some(&path), "MAIL_DIGEST_TEST_RULES").unwrap();
        assert_eq!(rules.category_rules.len(), 1);
        assert!(load_rules(None, "MAIL_DIGEST_TEST_RULES").is_err());
    }

    #[test]
    fn rules_default_when_env_unset() {
        unsafe { std::env::remove_var("MAIL_DIGEST_TEST_NO_RULES") };
        let rules = load_rules(None, "MAIL_DIGEST_TEST_NO_RULES").unwrap();
        assert_eq!(rules, RulesConfig::default());
    }

    #[test]
    fn digest_defaults() {
        let config = DigestConfig::default();
        assert_eq!(config.max_sentences, 3);
        assert!(!config.length_normalized);
        assert_eq!(config.rules.category_rules.len(), 3);
    }

    #[test]
    fn output_defaults() {
        let config = OutputConfig::default();
        assert_eq!(config.artifact_dir, PathBuf::from("emails"));
        assert_eq!(config.csv_path, PathBuf::from("email_summaries.csv"));
    }
}

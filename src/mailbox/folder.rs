//! Folder mailbox: a directory of `.txt` files, one message per file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::mailbox::{Mailbox, Message, keep_last};

/// Reads previously saved messages back from disk.
pub struct FolderMailbox {
    root: PathBuf,
}

impl FolderMailbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of the `.txt` files in the folder, sorted.
    async fn text_files(&self) -> Result<Vec<String>, FetchError> {
        let folder_err = |source| FetchError::Folder {
            path: self.root.clone(),
            source,
        };

        let mut entries = fs::read_dir(&self.root).await.map_err(folder_err)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(folder_err)? {
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                warn!(path = %entry.path().display(), "Skipping non UTF-8 file name");
                continue;
            };
            if !name.to_lowercase().ends_with(".txt") {
                continue;
            }
            if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl Mailbox for FolderMailbox {
    fn name(&self) -> &str {
        "folder"
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Message>, FetchError> {
        let names = keep_last(self.text_files().await?, limit);
        info!(folder = %self.root.display(), files = names.len(), "Reading message files");

        let mut messages = Vec::with_capacity(names.len());
        for name in names {
            let path = self.root.join(&name);
            let message = match fs::read(&path).await {
                Ok(bytes) => Message::new(&name, String::from_utf8_lossy(&bytes)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read message file");
                    Message::malformed(&name, format!("unreadable file: {e}"))
                }
            };
            debug!(identifier = %message.identifier, "Loaded message");
            messages.push(message);
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reads_only_txt_files_sorted() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "Second message.").unwrap();
        std::fs::write(dir.path().join("a.TXT"), "First message.").unwrap();
        std::fs::write(dir.path().join("notes.md"), "Not a message.").unwrap();
        std::fs::create_dir(dir.path().join("sub.txt")).unwrap();

        let mailbox = FolderMailbox::new(dir.path());
        let messages = mailbox.fetch_recent(usize::MAX).await.unwrap();

        let names: Vec<_> = messages.iter().map(|m| m.identifier.as_str()).collect();
        assert_eq!(names, vec!["a.TXT", "b.txt"]);
        assert_eq!(messages[0].body, "First message.");
    }

    #[tokio::test]
    async fn limit_keeps_last_files() {
        let dir = TempDir::new().unwrap();
        for name in ["1.txt", "2.txt", "3.txt"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }

        let messages = FolderMailbox::new(dir.path()).fetch_recent(2).await.unwrap();
        let names: Vec<_> = messages.iter().map(|m| m.identifier.as_str()).collect();
        assert_eq!(names, vec!["2.txt", "3.txt"]);
    }

    #[tokio::test]
    async fn invalid_utf8_is_decoded_lossily() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bin.txt"), b"Hello \xff world.").unwrap();

        let messages = FolderMailbox::new(dir.path()).fetch_recent(10).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].body.starts_with("Hello "));
        assert!(messages[0].body.ends_with(" world."));
        assert!(messages[0].defect.is_none());
    }

    #[tokio::test]
    async fn missing_folder_is_fetch_error() {
        let dir = TempDir::new().unwrap();
        let mailbox = FolderMailbox::new(dir.path().join("missing"));
        let result = mailbox.fetch_recent(10).await;
        assert!(matches!(result, Err(FetchError::Folder { .. })));
    }

    #[tokio::test]
    async fn empty_folder_yields_no_messages() {
        let dir = TempDir::new().unwrap();
        let messages = FolderMailbox::new(dir.path()).fetch_recent(10).await.unwrap();
        assert!(messages.is_empty());
    }
}

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use mail_digest::config::{DigestConfig, MailboxConfig, OutputConfig};
use mail_digest::mailbox::{FolderMailbox, ImapMailbox, Mailbox};
use mail_digest::output::{ArtifactStore, CsvReport, FileArtifactStore};
use mail_digest::pipeline::DigestPipeline;

#[derive(Parser)]
#[command(name = "mail-digest", version)]
#[command(about = "Summarize and categorize email into a CSV report")]
struct Cli {
    /// Sentences kept per summary
    #[arg(long, global = true, value_name = "N")]
    max_sentences: Option<usize>,

    /// JSON file with category and urgency keyword rules
    #[arg(long, global = true, value_name = "FILE")]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch recent messages over IMAP, save them, and write the report
    Fetch {
        /// Number of most recent messages to fetch
        #[arg(short, long)]
        limit: Option<usize>,
        /// Report path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory for the saved message text files
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
    /// Process a folder of .txt files (one message per file)
    Folder {
        /// Folder containing .txt files
        input: PathBuf,
        /// Report path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only the last N files by name
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // A missing .env is fine; variables may come from the shell.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut digest = DigestConfig::from_env(cli.rules.as_deref())
        .context("Failed to load digest configuration")?;
    if let Some(n) = cli.max_sentences {
        digest.max_sentences = n;
    }
    let mut output = OutputConfig::from_env().context("Failed to load output configuration")?;
    let pipeline = DigestPipeline::from_config(&digest);

    let (mailbox, limit, store): (Box<dyn Mailbox>, usize, Option<FileArtifactStore>) =
        match cli.command {
            Command::Fetch {
                limit,
                output: csv,
                save_dir,
            } => {
                let mailbox_config =
                    MailboxConfig::from_env().context("Failed to load mailbox configuration")?;
                let limit = limit.unwrap_or(mailbox_config.max_messages);
                if let Some(csv) = csv {
                    output.csv_path = csv;
                }
                if let Some(dir) = save_dir {
                    output.artifact_dir = dir;
                }
                let store = FileArtifactStore::new(&output.artifact_dir);
                store.ensure_dirs().await?;
                (Box::new(ImapMailbox::new(mailbox_config)), limit, Some(store))
            }
            Command::Folder {
                input,
                output: csv,
                limit,
            } => {
                if let Some(csv) = csv {
                    output.csv_path = csv;
                }
                (
                    Box::new(FolderMailbox::new(input)),
                    limit.unwrap_or(usize::MAX),
                    None,
                )
            }
        };

    let mut report = CsvReport::create(&output.csv_path)
        .with_context(|| format!("Failed to create {}", output.csv_path.display()))?;

    let summary = pipeline
        .run(
            mailbox.as_ref(),
            limit,
            store.as_ref().map(|s| s as &dyn ArtifactStore),
            &mut report,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Digest run failed");
            e
        })?;

    println!(
        "Processed {} messages. Results saved to {}.",
        summary.processed,
        output.csv_path.display()
    );

    Ok(())
}

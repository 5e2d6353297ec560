//! Persistent error log.
//!
//! Every recorded failure is appended to a plain-text log file as a
//! timestamped line. Logging is best-effort: a log write failure is
//! reported to stderr and never interrupts processing.

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Append-only, timestamped error log.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one `<timestamp> - ERROR - <message>` line.
    pub async fn record(&self, message: &str) {
        let line = format!(
            "{} - ERROR - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        );

        let result = async {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            file.write_all(line.as_bytes()).await
        }
        .await;

        if let Err(e) = result {
            eprintln!(
                "Warning: could not write to error log {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

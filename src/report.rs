//! End-of-run report files.
//!
//! Two plain-text artifacts are produced after a run: a fixed-width table
//! of schema validation failures and a flat list of XML files no
//! stylesheet matched. Reports land alongside the executable unless a
//! report directory is configured, and each run overwrites whatever a
//! previous run left there; an empty report deletes the stale file.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::Result;
use crate::pipeline::RunReport;

pub const VALIDATION_REPORT_FILE: &str = "validation_report.txt";
pub const UNMATCHED_REPORT_FILE: &str = "unmatched_files_report.txt";

/// Writes the end-of-run report files.
#[derive(Debug, Clone)]
pub struct Reporter {
    report_dir: PathBuf,
}

impl Reporter {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    /// The directory holding the running executable, falling back to the
    /// working directory when it cannot be determined.
    pub fn default_dir() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn validation_report_path(&self) -> PathBuf {
        self.report_dir.join(VALIDATION_REPORT_FILE)
    }

    pub fn unmatched_report_path(&self) -> PathBuf {
        self.report_dir.join(UNMATCHED_REPORT_FILE)
    }

    /// Write the validation failure table. Returns the report path, or
    /// `None` when there were no failures (any stale report is removed).
    pub async fn write_validation_report(
        &self,
        report: &RunReport,
    ) -> Result<Option<PathBuf>> {
        let path = self.validation_report_path();

        if report.validation_errors.is_empty() {
            let _ = fs::remove_file(&path).await;
            return Ok(None);
        }

        let rows: Vec<(String, String)> = report
            .validation_errors
            .iter()
            .map(|(file, error)| {
                (
                    file.display().to_string(),
                    flatten_message(error),
                )
            })
            .collect();

        fs::write(&path, render_table(&rows)).await?;
        Ok(Some(path))
    }

    /// Write the unmatched-files list. Returns the report path, or `None`
    /// when every file matched (any stale report is removed).
    pub async fn write_unmatched_report(&self, report: &RunReport) -> Result<Option<PathBuf>> {
        let path = self.unmatched_report_path();

        if report.unmatched.is_empty() {
            let _ = fs::remove_file(&path).await;
            return Ok(None);
        }

        let mut contents = String::from("Unmatched XML Files (no matching XSLT):\n\n");
        for file in &report.unmatched {
            contents.push_str(&file.display().to_string());
            contents.push('\n');
        }

        fs::write(&path, contents).await?;
        Ok(Some(path))
    }
}

/// Validator output is often multi-line; rows must stay on one line.
fn flatten_message(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Fixed-width two-column table, columns sized to the longest entries.
fn render_table(rows: &[(String, String)]) -> String {
    let file_header = "File Path";
    let error_header = "Error";

    let file_width = rows
        .iter()
        .map(|(f, _)| f.chars().count())
        .chain([file_header.len()])
        .max()
        .unwrap_or(0);
    let error_width = rows
        .iter()
        .map(|(_, e)| e.chars().count())
        .chain([error_header.len()])
        .max()
        .unwrap_or(0);

    let separator = format!(
        "+{}+{}+",
        "-".repeat(file_width + 2),
        "-".repeat(error_width + 2)
    );

    let mut table = String::from("XML Schema Validation Error Report\n");
    table.push_str(&separator);
    table.push('\n');
    table.push_str(&format!(
        "| {:<file_width$} | {:<error_width$} |\n",
        file_header, error_header
    ));
    table.push_str(&separator);
    table.push('\n');

    for (file, error) in rows {
        table.push_str(&format!(
            "| {:<file_width$} | {:<error_width$} |\n",
            file, error
        ));
    }

    table.push_str(&separator);
    table.push('\n');
    table
}

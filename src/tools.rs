//! External tool invocation.
//!
//! Transformation, formatting, and schema validation are delegated to
//! command-line tools (Saxon for XSLT, xmllint for the rest). Each tool
//! sits behind a narrow async trait so the pipeline can be exercised in
//! tests with in-process fakes. Every invocation runs under one timeout;
//! a timed-out child is killed and reported as a failure. Nothing here
//! retries: each tool is attempted exactly once per file.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{Result, TransformError};

/// Applies an XSLT stylesheet to a source document, writing the result
/// to a destination path.
#[async_trait]
pub trait XsltTransformer: Send + Sync {
    async fn transform(&self, source: &Path, stylesheet: &Path, destination: &Path)
    -> Result<()>;
}

/// Pretty-prints an XML file in place.
#[async_trait]
pub trait XmlFormatter: Send + Sync {
    async fn format(&self, file: &Path) -> Result<()>;
}

/// Checks an XML file against an XSD schema.
#[async_trait]
pub trait SchemaValidator: Send + Sync {
    async fn validate(&self, file: &Path, schema: &Path) -> Result<()>;
}

/// Run a command to completion under a timeout, capturing output.
/// `Ok(None)` means the timeout elapsed; the child is killed on drop.
async fn run_with_timeout(mut command: Command, limit: Duration) -> std::io::Result<Option<Output>> {
    command.kill_on_drop(true);
    match timeout(limit, command.output()).await {
        Ok(output) => output.map(Some),
        Err(_) => Ok(None),
    }
}

/// Captured stderr, falling back to stdout, then a generic message.
fn diagnostic_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !stdout.is_empty() {
        return stdout;
    }
    "command failed with no diagnostic output".to_string()
}

/// XSLT transformation via the Saxon jar.
///
/// Invoked as `java -jar <saxon.jar> -s:<source> -xsl:<stylesheet>
/// -o:<destination>`.
#[derive(Debug, Clone)]
pub struct SaxonTransformer {
    java_bin: String,
    jar: PathBuf,
    timeout: Duration,
}

impl SaxonTransformer {
    pub fn new(java_bin: impl Into<String>, jar: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            java_bin: java_bin.into(),
            jar: jar.into(),
            timeout,
        }
    }
}

#[async_trait]
impl XsltTransformer for SaxonTransformer {
    async fn transform(
        &self,
        source: &Path,
        stylesheet: &Path,
        destination: &Path,
    ) -> Result<()> {
        let mut command = Command::new(&self.java_bin);
        command
            .arg("-jar")
            .arg(&self.jar)
            .arg(format!("-s:{}", source.display()))
            .arg(format!("-xsl:{}", stylesheet.display()))
            .arg(format!("-o:{}", destination.display()));

        let output = run_with_timeout(command, self.timeout)
            .await
            .map_err(|e| TransformError::TransformFailed {
                file: source.to_path_buf(),
                details: format!("failed to invoke {}: {}", self.java_bin, e),
            })?
            .ok_or_else(|| TransformError::TransformTimeout {
                file: source.to_path_buf(),
                timeout_seconds: self.timeout.as_secs(),
            })?;

        if !output.status.success() {
            return Err(TransformError::TransformFailed {
                file: source.to_path_buf(),
                details: diagnostic_text(&output),
            });
        }

        // Saxon reports success without guaranteeing the destination was
        // written (e.g. an empty result document with -o into a bad path).
        if !tokio::fs::try_exists(destination).await.unwrap_or(false) {
            return Err(TransformError::TransformFailed {
                file: source.to_path_buf(),
                details: format!(
                    "engine exited successfully but produced no output at {}",
                    destination.display()
                ),
            });
        }

        Ok(())
    }
}

/// In-place pretty-printing via `xmllint --format`.
///
/// Writes to a temporary sibling file, then renames over the original so
/// a formatter crash never destroys the transformed document.
#[derive(Debug, Clone)]
pub struct XmllintFormatter {
    xmllint_bin: String,
    timeout: Duration,
}

impl XmllintFormatter {
    pub fn new(xmllint_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            xmllint_bin: xmllint_bin.into(),
            timeout,
        }
    }

    fn temp_path(file: &Path) -> PathBuf {
        let mut name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output.xml".to_string());
        name.push_str(".fmt.tmp");
        file.with_file_name(name)
    }
}

#[async_trait]
impl XmlFormatter for XmllintFormatter {
    async fn format(&self, file: &Path) -> Result<()> {
        let temp = Self::temp_path(file);

        let mut command = Command::new(&self.xmllint_bin);
        command.arg("--format").arg(file).arg("-o").arg(&temp);

        let failed = |details: String| TransformError::FormatFailed {
            file: file.to_path_buf(),
            details,
        };

        let output = run_with_timeout(command, self.timeout)
            .await
            .map_err(|e| failed(format!("failed to invoke {}: {}", self.xmllint_bin, e)))?
            .ok_or_else(|| {
                failed(format!(
                    "formatter timed out after {} seconds",
                    self.timeout.as_secs()
                ))
            })?;

        if !output.status.success() {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(failed(diagnostic_text(&output)));
        }

        tokio::fs::rename(&temp, file)
            .await
            .map_err(|e| failed(format!("failed to replace original: {}", e)))?;

        Ok(())
    }
}

/// Schema validation via `xmllint --noout --schema`.
#[derive(Debug, Clone)]
pub struct XmllintValidator {
    xmllint_bin: String,
    timeout: Duration,
}

impl XmllintValidator {
    pub fn new(xmllint_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            xmllint_bin: xmllint_bin.into(),
            timeout,
        }
    }
}

#[async_trait]
impl SchemaValidator for XmllintValidator {
    async fn validate(&self, file: &Path, schema: &Path) -> Result<()> {
        let mut command = Command::new(&self.xmllint_bin);
        command.arg("--noout").arg("--schema").arg(schema).arg(file);

        let failed = |details: String| TransformError::ValidationFailed {
            file: file.to_path_buf(),
            details,
        };

        // An invocation error (tool missing, timeout) is recorded like any
        // other validation failure, never propagated as fatal.
        let output = run_with_timeout(command, self.timeout)
            .await
            .map_err(|e| failed(format!("failed to invoke {}: {}", self.xmllint_bin, e)))?
            .ok_or_else(|| {
                failed(format!(
                    "validator timed out after {} seconds",
                    self.timeout.as_secs()
                ))
            })?;

        if !output.status.success() {
            return Err(failed(diagnostic_text(&output)));
        }

        Ok(())
    }
}

//! In-process stand-ins for the external tools, so pipeline behavior can
//! be exercised without Saxon or xmllint on the test machine.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::fs;

use transform_xml::{
    Result, SchemaValidator, TransformError, XmlFormatter, XsltTransformer,
};

/// Fake XSLT engine: writes a canned document naming its inputs, or fails
/// for configured source file names.
#[derive(Clone, Default)]
pub struct FakeTransformer {
    fail_for: HashSet<String>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(names: &[&str]) -> Self {
        Self {
            fail_for: names.iter().map(|n| n.to_string()).collect(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl XsltTransformer for FakeTransformer {
    async fn transform(
        &self,
        source: &Path,
        stylesheet: &Path,
        destination: &Path,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(source.to_path_buf());

        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if self.fail_for.contains(name) {
            return Err(TransformError::TransformFailed {
                file: source.to_path_buf(),
                details: "simulated engine failure".to_string(),
            });
        }

        let body = fs::read_to_string(source).await.unwrap_or_default();
        let document = format!(
            "<transformed stylesheet=\"{}\">{}</transformed>",
            stylesheet
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default(),
            body.trim()
        );
        fs::write(destination, document).await?;
        Ok(())
    }
}

/// Fake pretty-printer: appends a trailing newline as its "formatting",
/// or fails without touching the file.
#[derive(Clone, Default)]
pub struct FakeFormatter {
    fail: bool,
}

impl FakeFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl XmlFormatter for FakeFormatter {
    async fn format(&self, file: &Path) -> Result<()> {
        if self.fail {
            return Err(TransformError::FormatFailed {
                file: file.to_path_buf(),
                details: "simulated formatter failure".to_string(),
            });
        }

        let mut contents = fs::read_to_string(file).await?;
        contents.push('\n');
        fs::write(file, contents).await?;
        Ok(())
    }
}

/// Fake schema validator: a document containing the marker text
/// `schema-violation` is invalid, everything else is valid.
#[derive(Clone, Default)]
pub struct FakeValidator;

impl FakeValidator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SchemaValidator for FakeValidator {
    async fn validate(&self, file: &Path, _schema: &Path) -> Result<()> {
        let contents = fs::read_to_string(file).await.unwrap_or_default();
        if contents.contains("schema-violation") {
            return Err(TransformError::ValidationFailed {
                file: file.to_path_buf(),
                details: format!(
                    "{}: Schemas validity error: Element 'schema-violation': \
                     This element is not expected.",
                    file.display()
                ),
            });
        }
        Ok(())
    }
}

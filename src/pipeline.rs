//! Transformation pipeline.
//!
//! Walks the input tree, pairs each XML file with a stylesheet, and drives
//! transform, format, and optional validation per file, strictly one file
//! at a time. Failures never abort the run: each is recorded on the
//! returned [`RunReport`] (and in the error log) and processing moves on
//! to the next file. The stylesheet index is loaded once by the caller,
//! before the walk begins.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use globset::{GlobSet, GlobSetBuilder};
use tokio::fs;

use crate::error::{Result, TransformError};
use crate::error_log::ErrorLog;
use crate::mirror::OutputLayout;
use crate::stylesheet::StylesheetIndex;
use crate::tools::{SchemaValidator, XmlFormatter, XsltTransformer};

/// Everything one run accumulated, threaded explicitly instead of living
/// in process-wide state so a single process can host several runs.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// XML files visited by the walker
    pub scanned: usize,
    /// Files successfully transformed
    pub transformed: usize,
    /// Input files no stylesheet matched
    pub unmatched: Vec<PathBuf>,
    /// Input path -> failure detail for transform (and path-resolution) errors
    pub transform_failures: Vec<(PathBuf, String)>,
    /// Output path -> failure detail; the unformatted output is retained
    pub format_failures: Vec<(PathBuf, String)>,
    /// Output path -> validator message, in processing order
    pub validation_errors: Vec<(PathBuf, String)>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.unmatched.is_empty()
            || !self.transform_failures.is_empty()
            || !self.format_failures.is_empty()
            || !self.validation_errors.is_empty()
    }
}

/// Sequential transform/format/validate pipeline over one input tree.
pub struct Pipeline {
    index: StylesheetIndex,
    layout: OutputLayout,
    transformer: Box<dyn XsltTransformer>,
    formatter: Box<dyn XmlFormatter>,
    validator: Box<dyn SchemaValidator>,
    schema: Option<PathBuf>,
    error_log: ErrorLog,
    include_set: Option<GlobSet>,
    exclude_set: Option<GlobSet>,
    quiet: bool,
}

impl Pipeline {
    pub fn new(
        index: StylesheetIndex,
        layout: OutputLayout,
        transformer: impl XsltTransformer + 'static,
        formatter: impl XmlFormatter + 'static,
        validator: impl SchemaValidator + 'static,
        error_log: ErrorLog,
    ) -> Self {
        Self {
            index,
            layout,
            transformer: Box::new(transformer),
            formatter: Box::new(formatter),
            validator: Box::new(validator),
            schema: None,
            error_log,
            include_set: None,
            exclude_set: None,
            quiet: false,
        }
    }

    /// Enable schema validation of every transformed file.
    pub fn with_schema(mut self, schema: Option<PathBuf>) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Restrict the walk to files matching at least one pattern.
    pub fn with_include_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.include_set = build_glob_set(patterns)?;
        Ok(self)
    }

    /// Skip files matching any pattern.
    pub fn with_exclude_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude_set = build_glob_set(patterns)?;
        Ok(self)
    }

    /// Process every XML file under the input root.
    pub async fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::default();

        let mut files = Vec::new();
        self.collect_files(self.layout.input_root(), &mut files)
            .await?;
        // Platform-independent processing (and report) order.
        files.sort();

        for file in files {
            report.scanned += 1;
            self.process_file(&file, &mut report).await;
        }

        Ok(report)
    }

    /// Recursively gather candidate XML files, skipping the output tree.
    fn collect_files<'a>(
        &'a self,
        dir: &'a Path,
        files: &'a mut Vec<PathBuf>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + 'a>> {
        Box::pin(async move {
            let mut read_dir = fs::read_dir(dir).await.map_err(|e| {
                TransformError::FileSystemTraversal {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;

            while let Some(entry) = read_dir.next_entry().await.map_err(|e| {
                TransformError::FileSystemTraversal {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                }
            })? {
                let path = entry.path();
                let file_type = match entry.file_type().await {
                    Ok(t) => t,
                    Err(e) => {
                        eprintln!("Warning: cannot stat {}: {}", path.display(), e);
                        continue;
                    }
                };

                if file_type.is_dir() {
                    if self.layout.is_inside_output(&path) {
                        continue;
                    }
                    // Keep walking the rest of the tree on a bad subtree.
                    if let Err(e) = self.collect_files(&path, files).await {
                        eprintln!("Warning: {}", e);
                    }
                } else if file_type.is_file() && self.is_candidate(&path) {
                    files.push(path);
                }
            }

            Ok(())
        })
    }

    /// An `.xml` file (case-insensitive) passing the include/exclude sets.
    fn is_candidate(&self, path: &Path) -> bool {
        let is_xml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
        if !is_xml {
            return false;
        }

        if let Some(exclude_set) = &self.exclude_set
            && exclude_set.is_match(path)
        {
            return false;
        }

        if let Some(include_set) = &self.include_set {
            return include_set.is_match(path);
        }

        true
    }

    async fn process_file(&self, input: &Path, report: &mut RunReport) {
        let Some(file_name) = input.file_name().and_then(|n| n.to_str()) else {
            return;
        };

        let Some(stylesheet) = self.index.find_match(file_name) else {
            if !self.quiet {
                eprintln!("No matching XSLT for: {}", input.display());
            }
            self.error_log
                .record(&format!("No matching XSLT for {}", input.display()))
                .await;
            report.unmatched.push(input.to_path_buf());
            return;
        };
        let stylesheet_path = self.index.path_of(stylesheet);

        // A resolution failure (directory creation) is fatal for this file only.
        let output_path = match self.layout.resolve(input).await {
            Ok(path) => path,
            Err(e) => {
                let details = e.details();
                self.error_log
                    .record(&format!("{} - {}", input.display(), details))
                    .await;
                report
                    .transform_failures
                    .push((input.to_path_buf(), details));
                return;
            }
        };

        if let Err(e) = self
            .transformer
            .transform(input, &stylesheet_path, &output_path)
            .await
        {
            let details = e.details();
            if !self.quiet {
                eprintln!("Error transforming {}: {}", input.display(), details);
            }
            self.error_log
                .record(&format!("{} - {}", input.display(), details))
                .await;
            report
                .transform_failures
                .push((input.to_path_buf(), details));
            return;
        }

        report.transformed += 1;
        if !self.quiet {
            println!(
                "Transformed: {} -> {}",
                input.display(),
                output_path.display()
            );
        }

        if let Err(e) = self.formatter.format(&output_path).await {
            let details = e.details();
            self.error_log
                .record(&format!(
                    "Formatting failed for {}: {}",
                    output_path.display(),
                    details
                ))
                .await;
            report.format_failures.push((output_path.clone(), details));
        }

        if let Some(schema) = &self.schema
            && let Err(e) = self.validator.validate(&output_path, schema).await
        {
            report
                .validation_errors
                .push((output_path.clone(), e.details()));
        }
    }
}

fn build_glob_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = globset::GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                TransformError::Config(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
        builder.add(glob);
    }

    Ok(Some(builder.build().map_err(|e| {
        TransformError::Config(format!("Failed to build glob set: {}", e))
    })?))
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::cli::{Cli, VerbosityLevel};
use crate::mirror::PlacementPolicy;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub layout: LayoutConfig,
    pub reports: ReportConfig,
    pub files: FileConfig,
    pub output: OutputConfig,
}

/// External tool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Java executable used to run Saxon
    pub java_bin: String,
    /// Path to the Saxon jar
    pub saxon_jar: Option<PathBuf>,
    /// xmllint executable used for formatting and validation
    pub xmllint_bin: String,
    /// Timeout applied to every subprocess, in seconds
    pub timeout_seconds: u64,
}

/// Input/output tree layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Root of the XML tree to process
    pub input_root: Option<PathBuf>,
    /// Directory holding the .xsl/.xslt stylesheets
    pub stylesheet_dir: Option<PathBuf>,
    /// XSD schema; presence enables validation
    pub schema: Option<PathBuf>,
    /// Name of the mirrored output folder
    pub output_folder: String,
    /// Where the output folder sits relative to the input root
    pub placement: PlacementPolicy,
}

/// Report and log destinations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory for end-of-run reports (default: alongside the executable)
    pub report_dir: Option<PathBuf>,
    /// Timestamped error log path
    pub error_log: PathBuf,
}

/// File selection during traversal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct FileConfig {
    /// Include patterns (glob syntax)
    pub include_patterns: Vec<String>,
    /// Exclude patterns (glob syntax)
    pub exclude_patterns: Vec<String>,
}

/// Console output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (errors only)
    pub quiet: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            java_bin: "java".to_string(),
            saxon_jar: None,
            xmllint_bin: "xmllint".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            input_root: None,
            stylesheet_dir: None,
            schema: None,
            output_folder: "Modified".to_string(),
            placement: PlacementPolicy::Sibling,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_dir: None,
            error_log: PathBuf::from("error_log.txt"),
        }
    }
}

impl Config {
    pub fn verbosity(&self) -> VerbosityLevel {
        if self.output.quiet {
            VerbosityLevel::Quiet
        } else if self.output.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.engine.timeout_seconds)
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> environment -> CLI
    pub async fn load_config(cli: &Cli, env: &dyn EnvProvider) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            config = Self::load_from_file(config_path).await?;
        } else if let Some(found) = Self::find_config_file().await? {
            config = found;
        }

        config = Self::apply_environment_overrides(config, env)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            other => Err(ConfigError::UnsupportedFormat(format!(
                "expected .toml or .json, got {:?}",
                other.unwrap_or("none")
            ))),
        }
    }

    /// Look for a configuration file in the working directory.
    async fn find_config_file() -> Result<Option<Config>> {
        for candidate in ["transform-xml.toml", ".transform-xml.toml"] {
            let path = Path::new(candidate);
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                return Ok(Some(Self::load_from_file(path).await?));
            }
        }
        Ok(None)
    }

    /// Apply TRANSFORM_XML_* environment variable overrides.
    fn apply_environment_overrides(
        mut config: Config,
        env: &dyn EnvProvider,
    ) -> Result<Config> {
        if let Some(jar) = env.get("TRANSFORM_XML_SAXON_JAR") {
            config.engine.saxon_jar = Some(PathBuf::from(jar));
        }
        if let Some(java) = env.get("TRANSFORM_XML_JAVA") {
            config.engine.java_bin = java;
        }
        if let Some(xmllint) = env.get("TRANSFORM_XML_XMLLINT") {
            config.engine.xmllint_bin = xmllint;
        }
        if let Some(timeout) = env.get("TRANSFORM_XML_TIMEOUT") {
            config.engine.timeout_seconds = timeout.parse().map_err(|_| {
                ConfigError::Environment(format!(
                    "TRANSFORM_XML_TIMEOUT must be an integer, got {:?}",
                    timeout
                ))
            })?;
        }
        if let Some(folder) = env.get("TRANSFORM_XML_OUTPUT_FOLDER") {
            config.layout.output_folder = folder;
        }
        if let Some(log) = env.get("TRANSFORM_XML_ERROR_LOG") {
            config.reports.error_log = PathBuf::from(log);
        }
        Ok(config)
    }

    /// Apply CLI argument overrides (highest precedence).
    fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        config.layout.input_root = Some(cli.input_root.clone());

        if let Some(dir) = &cli.stylesheet_dir {
            config.layout.stylesheet_dir = Some(dir.clone());
        }
        if let Some(schema) = &cli.schema {
            config.layout.schema = Some(schema.clone());
        }
        if let Some(jar) = &cli.saxon_jar {
            config.engine.saxon_jar = Some(jar.clone());
        }
        if let Some(java) = &cli.java_bin {
            config.engine.java_bin = java.clone();
        }
        if let Some(xmllint) = &cli.xmllint_bin {
            config.engine.xmllint_bin = xmllint.clone();
        }
        if let Some(folder) = &cli.output_folder {
            config.layout.output_folder = folder.clone();
        }
        if let Some(placement) = cli.placement {
            config.layout.placement = placement;
        }
        if let Some(dir) = &cli.report_dir {
            config.reports.report_dir = Some(dir.clone());
        }
        if let Some(log) = &cli.error_log {
            config.reports.error_log = log.clone();
        }
        if let Some(timeout) = cli.timeout {
            config.engine.timeout_seconds = timeout;
        }
        if !cli.include_patterns.is_empty() {
            config.files.include_patterns = cli.include_patterns.clone();
        }
        if !cli.exclude_patterns.is_empty() {
            config.files.exclude_patterns = cli.exclude_patterns.clone();
        }

        config.output.verbose = cli.verbose;
        config.output.quiet = cli.quiet;

        config
    }

    /// Validate the merged configuration.
    fn validate_config(config: &Config) -> Result<()> {
        if config.layout.input_root.is_none() {
            return Err(ConfigError::Validation(
                "input root is required".to_string(),
            ));
        }
        if config.layout.stylesheet_dir.is_none() {
            return Err(ConfigError::Validation(
                "stylesheet directory is required (--stylesheets or config file)".to_string(),
            ));
        }
        if config.engine.saxon_jar.is_none() {
            return Err(ConfigError::Validation(
                "Saxon jar location is required (--saxon-jar, config file, or TRANSFORM_XML_SAXON_JAR)"
                    .to_string(),
            ));
        }
        if config.engine.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "timeout must be greater than 0 seconds".to_string(),
            ));
        }
        if config.layout.output_folder.is_empty()
            || config.layout.output_folder.contains(['/', '\\'])
        {
            return Err(ConfigError::Validation(format!(
                "invalid output folder name: {:?}",
                config.layout.output_folder
            )));
        }
        Ok(())
    }
}

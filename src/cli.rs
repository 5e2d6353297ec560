use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::mirror::PlacementPolicy;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show critical errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
}

/// Batch XSLT transformation tool
#[derive(Parser, Debug, Clone)]
#[command(name = "transform-xml")]
#[command(
    about = "Transform XML files with matched XSLT stylesheets, pretty-print and validate the results"
)]
#[command(version)]
pub struct Cli {
    /// Root directory to scan for XML files
    #[arg(help = "Directory tree containing the XML files to transform")]
    pub input_root: PathBuf,

    /// Directory containing .xsl/.xslt stylesheets
    #[arg(short = 's', long = "stylesheets")]
    pub stylesheet_dir: Option<PathBuf>,

    /// XSD schema to validate transformed files against (enables validation)
    #[arg(long = "schema")]
    pub schema: Option<PathBuf>,

    /// Path to the Saxon jar used for transformation
    #[arg(long = "saxon-jar")]
    pub saxon_jar: Option<PathBuf>,

    /// Java executable used to run Saxon
    #[arg(long = "java")]
    pub java_bin: Option<String>,

    /// xmllint executable used for formatting and validation
    #[arg(long = "xmllint")]
    pub xmllint_bin: Option<String>,

    /// Name of the output folder holding the mirrored tree
    #[arg(short = 'o', long = "output-folder")]
    pub output_folder: Option<String>,

    /// Output folder placement relative to the input root
    #[arg(long = "placement", value_enum)]
    pub placement: Option<PlacementPolicy>,

    /// Directory for the end-of-run report files
    #[arg(long = "report-dir")]
    pub report_dir: Option<PathBuf>,

    /// Path of the timestamped error log
    #[arg(long = "error-log")]
    pub error_log: Option<PathBuf>,

    /// Subprocess timeout in seconds
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Include file patterns (glob syntax)
    #[arg(long = "include", action = clap::ArgAction::Append)]
    pub include_patterns: Vec<String>,

    /// Exclude file patterns (glob syntax)
    #[arg(long = "exclude", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.input_root.exists() {
            return Err(format!(
                "Input root does not exist: {}",
                self.input_root.display()
            ));
        }
        if let Some(timeout) = self.timeout
            && timeout == 0
        {
            return Err("Timeout must be greater than 0 seconds".to_string());
        }
        Ok(())
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

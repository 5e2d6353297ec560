//! Console summary output.
//!
//! Formats the end-of-run summary for humans, with ANSI color when
//! stdout is a terminal.

use atty;

use crate::cli::VerbosityLevel;
use crate::pipeline::RunReport;

/// Simple output formatter for human-readable results
pub struct Output {
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    #[cfg(test)]
    fn plain(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_colors: false,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_summary(&self, report: &RunReport) -> String {
        let mut output = String::new();

        if self.verbosity == VerbosityLevel::Quiet {
            if report.has_failures() {
                output.push_str(&format!(
                    "Unmatched: {} Transform failures: {} Validation errors: {}\n",
                    report.unmatched.len(),
                    report.transform_failures.len(),
                    report.validation_errors.len()
                ));
            }
            return output;
        }

        output.push_str("Transformation Summary:\n");
        output.push_str(&format!("  XML files scanned: {}\n", report.scanned));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Transformed:", "32"),
            report.transformed
        ));

        if !report.unmatched.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Unmatched:", "33"),
                report.unmatched.len()
            ));
        }
        if !report.transform_failures.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Transform failures:", "31"),
                report.transform_failures.len()
            ));
        }
        if !report.format_failures.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Format failures:", "33"),
                report.format_failures.len()
            ));
        }
        if !report.validation_errors.is_empty() {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Validation errors:", "31"),
                report.validation_errors.len()
            ));
        }

        if self.verbosity >= VerbosityLevel::Verbose {
            for file in &report.unmatched {
                output.push_str(&format!("  unmatched: {}\n", file.display()));
            }
            for (file, details) in &report.transform_failures {
                output.push_str(&format!("  failed: {} - {}\n", file.display(), details));
            }
            for (file, details) in &report.validation_errors {
                output.push_str(&format!("  invalid: {} - {}\n", file.display(), details));
            }
        }

        output
    }
}

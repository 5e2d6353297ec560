use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No stylesheet matched: {file}")]
    NoMatch { file: PathBuf },

    #[error("Transformation failed: {file} - {details}")]
    TransformFailed { file: PathBuf, details: String },

    #[error("Transformation timed out: {file} after {timeout_seconds} seconds")]
    TransformTimeout { file: PathBuf, timeout_seconds: u64 },

    #[error("Formatting failed: {file} - {details}")]
    FormatFailed { file: PathBuf, details: String },

    #[error("Schema validation failed: {file} - {details}")]
    ValidationFailed { file: PathBuf, details: String },

    #[error("Cannot create output directory: {path} - {details}")]
    DirectoryCreation { path: PathBuf, details: String },

    #[error("Path is outside the input root: {path}")]
    OutsideInputRoot { path: PathBuf },

    #[error("Stylesheet directory not found: {path}")]
    StylesheetDirNotFound { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system traversal error: {path} - {reason}")]
    FileSystemTraversal { path: PathBuf, reason: String },
}

impl TransformError {
    /// The failure detail recorded in reports and the error log.
    ///
    /// For tool failures this is the captured diagnostic text rather than
    /// the full display string, which already names the file.
    pub fn details(&self) -> String {
        match self {
            TransformError::TransformFailed { details, .. }
            | TransformError::FormatFailed { details, .. }
            | TransformError::ValidationFailed { details, .. }
            | TransformError::DirectoryCreation { details, .. } => details.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_transform_error_display() {
        let no_match = TransformError::NoMatch {
            file: PathBuf::from("/data/Unknown.xml"),
        };
        assert!(no_match.to_string().contains("No stylesheet matched"));
        assert!(no_match.to_string().contains("Unknown.xml"));

        let failed = TransformError::TransformFailed {
            file: PathBuf::from("/data/Invoice1.xml"),
            details: "XTSE0165: stylesheet compile error".to_string(),
        };
        assert!(failed.to_string().contains("Transformation failed"));
        assert!(failed.to_string().contains("XTSE0165"));

        let timeout = TransformError::TransformTimeout {
            file: PathBuf::from("/data/Big.xml"),
            timeout_seconds: 30,
        };
        assert!(timeout.to_string().contains("timed out"));
        assert!(timeout.to_string().contains("30 seconds"));
    }

    #[test]
    fn test_details_strips_file_prefix() {
        let failed = TransformError::ValidationFailed {
            file: PathBuf::from("/out/Invoice1.xml"),
            details: "Element 'Total': This element is not expected.".to_string(),
        };
        assert_eq!(
            failed.details(),
            "Element 'Total': This element is not expected."
        );

        let no_match = TransformError::NoMatch {
            file: PathBuf::from("/data/Unknown.xml"),
        };
        assert!(no_match.details().contains("Unknown.xml"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access denied");
        let error: TransformError = io_error.into();

        match error {
            TransformError::Io(_) => (),
            _ => panic!("Expected TransformError::Io"),
        }
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error = TransformError::Io(io_error);

        assert!(error.source().is_some());
        assert_eq!(error.source().unwrap().to_string(), "File not found");
    }
}

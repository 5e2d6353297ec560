//! Stylesheet enumeration and filename matching.
//!
//! An XML file is paired with a stylesheet by a substring heuristic: the
//! file's stem is stripped of digits, trimmed, and uppercased into a match
//! key, and the first stylesheet whose uppercased name contains that key
//! wins. A parity guard on the literal `STATUS` keeps short document names
//! from matching longer status variants (`Message` must not pick up
//! `MessageStatus.xslt`).

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tokio::fs;

use crate::error::{Result, TransformError};

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Compute the match key for an XML filename: stem without digits,
/// trimmed and uppercased.
pub fn match_key(xml_filename: &str) -> String {
    let stem = Path::new(xml_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(xml_filename);
    DIGITS.replace_all(stem, "").trim().to_uppercase()
}

/// The set of stylesheets available for one run, loaded once before the walk.
#[derive(Debug, Clone)]
pub struct StylesheetIndex {
    dir: PathBuf,
    names: Vec<String>,
}

impl StylesheetIndex {
    /// Load every `.xsl`/`.xslt` entry from a directory.
    ///
    /// Filesystem enumeration order is platform-dependent, so entries are
    /// sorted longest name first (ties lexicographic). The matcher returns
    /// the first hit, so this makes the most specific stylesheet win
    /// deterministically on every platform.
    pub async fn load(dir: &Path) -> Result<Self> {
        let mut read_dir = fs::read_dir(dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TransformError::StylesheetDirNotFound {
                    path: dir.to_path_buf(),
                }
            } else {
                TransformError::Io(e)
            }
        })?;

        let mut names = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            if let Some(name) = entry.file_name().to_str()
                && (name.ends_with(".xsl") || name.ends_with(".xslt"))
            {
                names.push(name.to_string());
            }
        }

        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        Ok(Self {
            dir: dir.to_path_buf(),
            names,
        })
    }

    /// Build an index from in-memory names, in the given priority order.
    pub fn from_names(dir: impl Into<PathBuf>, names: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            names,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Full path of a stylesheet previously returned by [`find_match`].
    ///
    /// [`find_match`]: StylesheetIndex::find_match
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Find the stylesheet for an XML filename, or `None`.
    ///
    /// A candidate matches when its uppercased name contains the match key
    /// and the `STATUS` parity guard holds: `STATUS` appears in the key if
    /// and only if it appears in the candidate. A key that is empty after
    /// digit stripping (an all-digit filename) never matches; it would
    /// otherwise be a substring of everything.
    pub fn find_match(&self, xml_filename: &str) -> Option<&str> {
        let key = match_key(xml_filename);
        if key.is_empty() {
            return None;
        }
        let key_has_status = key.contains("STATUS");

        self.names
            .iter()
            .find(|name| {
                let candidate = name.trim().to_uppercase();
                candidate.contains(&key) && candidate.contains("STATUS") == key_has_status
            })
            .map(|name| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn index(names: &[&str]) -> StylesheetIndex {
        StylesheetIndex::from_names("/styles", names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_match_key_strips_digits_and_uppercases() {
        assert_eq!(match_key("Invoice123.xml"), "INVOICE");
        assert_eq!(match_key("invoice.xml"), "INVOICE");
        assert_eq!(match_key("Order2Confirm7.xml"), "ORDERCONFIRM");
        assert_eq!(match_key("999.xml"), "");
    }

    #[test]
    fn test_empty_index_never_matches() {
        let idx = index(&[]);
        assert_eq!(idx.find_match("Invoice1.xml"), None);
        assert_eq!(idx.find_match("anything.xml"), None);
    }

    #[test]
    fn test_match_is_case_and_digit_insensitive() {
        let idx = index(&["INVOICE.xslt"]);
        assert_eq!(idx.find_match("Invoice123.xml"), Some("INVOICE.xslt"));
        assert_eq!(idx.find_match("invoice.xml"), Some("INVOICE.xslt"));
    }

    #[test]
    fn test_status_guard_blocks_partial_match() {
        let idx = index(&["MessageStatus.xslt"]);
        // Key lacks STATUS, candidate has it.
        assert_eq!(idx.find_match("Message.xml"), None);
        assert_eq!(
            idx.find_match("MessageStatus.xml"),
            Some("MessageStatus.xslt")
        );
    }

    #[test]
    fn test_status_guard_requires_candidate_status() {
        let idx = index(&["Message.xslt"]);
        // Key has STATUS, candidate does not; the key is not a substring
        // anyway, but the guard would reject it regardless.
        assert_eq!(idx.find_match("MessageStatus1.xml"), None);
    }

    #[test]
    fn test_longest_name_wins_with_status_on_both_sides() {
        let idx = StylesheetIndex::from_names(
            "/styles",
            vec![
                "MessageStatus.xslt".to_string(),
                "Message.xslt".to_string(),
            ],
        );
        assert_eq!(idx.find_match("Message7.xml"), Some("Message.xslt"));
        assert_eq!(
            idx.find_match("MessageStatus7.xml"),
            Some("MessageStatus.xslt")
        );
    }

    #[test]
    fn test_all_digit_filename_never_matches() {
        let idx = index(&["Invoice.xslt", "Message.xslt"]);
        assert_eq!(idx.find_match("20240101.xml"), None);
    }

    #[test]
    fn test_path_of_joins_directory() {
        let idx = index(&["Invoice.xslt"]);
        assert_eq!(
            idx.path_of("Invoice.xslt"),
            PathBuf::from("/styles/Invoice.xslt")
        );
    }

    #[tokio::test]
    async fn test_load_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        for name in [
            "Invoice.xslt",
            "InvoiceDetail.xslt",
            "Order.xsl",
            "notes.txt",
            "schema.xsd",
        ] {
            tokio::fs::write(dir.join(name), "<xsl:stylesheet/>")
                .await
                .unwrap();
        }

        let idx = StylesheetIndex::load(dir).await.unwrap();
        assert_eq!(
            idx.names(),
            &[
                "InvoiceDetail.xslt".to_string(),
                "Invoice.xslt".to_string(),
                "Order.xsl".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("no-such-dir");

        let result = StylesheetIndex::load(&missing).await;
        match result {
            Err(TransformError::StylesheetDirNotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected StylesheetDirNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_suffix_is_case_sensitive() {
        let temp_dir = TempDir::new().unwrap();
        tokio::fs::write(temp_dir.path().join("Invoice.XSLT"), "<xsl:stylesheet/>")
            .await
            .unwrap();

        let idx = StylesheetIndex::load(temp_dir.path()).await.unwrap();
        assert!(idx.is_empty());
    }
}

pub mod fakes;

use std::path::{Path, PathBuf};
use tokio::fs;

/// Write a file, creating parent directories as needed.
pub async fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.unwrap();
    }
    fs::write(path, contents).await.unwrap();
}

/// Lay out a stylesheet directory with the given stylesheet names.
pub async fn create_stylesheet_dir(root: &Path, names: &[&str]) -> PathBuf {
    let dir = root.join("xslt");
    fs::create_dir_all(&dir).await.unwrap();
    for name in names {
        fs::write(
            dir.join(name),
            r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform"/>"#,
        )
        .await
        .unwrap();
    }
    dir
}

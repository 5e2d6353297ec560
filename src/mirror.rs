//! Mirrored output tree layout.
//!
//! Transformed documents land in a directory tree whose relative paths
//! exactly mirror the input tree, rooted under a configured output folder.
//! The folder is placed either as a sibling of the input root or nested
//! inside it; the two policies are incompatible, so the choice is explicit
//! and the walker consults [`OutputLayout::is_inside_output`] to guarantee
//! it never recurses into its own output under either policy.

use std::path::{Component, Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Result, TransformError};

/// Where the output folder sits relative to the input root.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PlacementPolicy {
    /// `parent(input_root)/<output_folder>/...`
    #[default]
    Sibling,
    /// `input_root/<output_folder>/...`
    Nested,
}

/// Resolves destination paths mirroring the input tree.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    input_root: PathBuf,
    output_root: PathBuf,
    output_folder: String,
}

impl OutputLayout {
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_folder: &str,
        policy: PlacementPolicy,
    ) -> Result<Self> {
        if output_folder.is_empty() || output_folder.contains(['/', '\\']) {
            return Err(TransformError::Config(format!(
                "invalid output folder name: {:?}",
                output_folder
            )));
        }

        let input_root = input_root.into();
        let output_root = match policy {
            PlacementPolicy::Sibling => input_root
                .parent()
                .ok_or_else(|| {
                    TransformError::Config(format!(
                        "input root {} has no parent for sibling output placement",
                        input_root.display()
                    ))
                })?
                .join(output_folder),
            PlacementPolicy::Nested => input_root.join(output_folder),
        };

        Ok(Self {
            input_root,
            output_root,
            output_folder: output_folder.to_string(),
        })
    }

    pub fn input_root(&self) -> &Path {
        &self.input_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Destination path for an input file, with all parent directories
    /// created before returning. Directory creation is idempotent; a
    /// creation failure is fatal for this file only.
    pub async fn resolve(&self, input_path: &Path) -> Result<PathBuf> {
        let relative = input_path.strip_prefix(&self.input_root).map_err(|_| {
            TransformError::OutsideInputRoot {
                path: input_path.to_path_buf(),
            }
        })?;

        let output_path = self.output_root.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| TransformError::DirectoryCreation {
                    path: parent.to_path_buf(),
                    details: e.to_string(),
                })?;
        }

        Ok(output_path)
    }

    /// True when a path lies in the output tree or carries the output
    /// folder name as a segment below the input root. The segment check
    /// keeps a re-run from reprocessing output left by a prior run even
    /// if that run used the other placement policy. Segments above the
    /// input root are ignored, so an input root that happens to live
    /// under a directory named like the output folder still gets walked.
    pub fn is_inside_output(&self, path: &Path) -> bool {
        if path.starts_with(&self.output_root) {
            return true;
        }
        let Ok(relative) = path.strip_prefix(&self.input_root) else {
            return false;
        };
        relative.components().any(|c| match c {
            Component::Normal(name) => name.to_str() == Some(self.output_folder.as_str()),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sibling_placement_roots_beside_input() {
        let layout =
            OutputLayout::new("/data/project/input", "Modified", PlacementPolicy::Sibling)
                .unwrap();
        assert_eq!(
            layout.output_root(),
            Path::new("/data/project/Modified")
        );
    }

    #[test]
    fn test_nested_placement_roots_inside_input() {
        let layout =
            OutputLayout::new("/data/project/input", "Modified", PlacementPolicy::Nested)
                .unwrap();
        assert_eq!(
            layout.output_root(),
            Path::new("/data/project/input/Modified")
        );
    }

    #[test]
    fn test_rejects_output_folder_with_separator() {
        let result = OutputLayout::new("/data/input", "a/b", PlacementPolicy::Sibling);
        assert!(matches!(result, Err(TransformError::Config(_))));

        let result = OutputLayout::new("/data/input", "", PlacementPolicy::Sibling);
        assert!(matches!(result, Err(TransformError::Config(_))));
    }

    #[tokio::test]
    async fn test_resolve_mirrors_relative_path() {
        let temp_dir = TempDir::new().unwrap();
        let input_root = temp_dir.path().join("input");
        fs::create_dir_all(input_root.join("A/B")).await.unwrap();

        let layout =
            OutputLayout::new(&input_root, "Modified", PlacementPolicy::Sibling).unwrap();
        let output = layout
            .resolve(&input_root.join("A/B/Invoice1.xml"))
            .await
            .unwrap();

        assert_eq!(
            output,
            temp_dir.path().join("Modified/A/B/Invoice1.xml")
        );
        // Parents exist before any write happens.
        assert!(output.parent().unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let input_root = temp_dir.path().join("input");
        fs::create_dir_all(&input_root).await.unwrap();

        let layout =
            OutputLayout::new(&input_root, "Modified", PlacementPolicy::Nested).unwrap();
        let first = layout.resolve(&input_root.join("a.xml")).await.unwrap();
        let second = layout.resolve(&input_root.join("a.xml")).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_resolve_rejects_path_outside_root() {
        let temp_dir = TempDir::new().unwrap();
        let input_root = temp_dir.path().join("input");
        fs::create_dir_all(&input_root).await.unwrap();

        let layout =
            OutputLayout::new(&input_root, "Modified", PlacementPolicy::Sibling).unwrap();
        let result = layout.resolve(Path::new("/elsewhere/file.xml")).await;
        assert!(matches!(
            result,
            Err(TransformError::OutsideInputRoot { .. })
        ));
    }

    #[test]
    fn test_is_inside_output_by_prefix_and_segment() {
        let layout =
            OutputLayout::new("/data/input", "Modified", PlacementPolicy::Sibling).unwrap();

        assert!(layout.is_inside_output(Path::new("/data/Modified/A/x.xml")));
        // Nested-style leftovers from a prior run are caught by segment.
        assert!(layout.is_inside_output(Path::new("/data/input/Modified/A/x.xml")));
        assert!(layout.is_inside_output(Path::new("/data/input/A/Modified/x.xml")));
        assert!(!layout.is_inside_output(Path::new("/data/input/A/x.xml")));
        // A directory merely containing the folder name is not output.
        assert!(!layout.is_inside_output(Path::new("/data/input/A/NotModified/x.xml")));
    }

    #[test]
    fn test_ancestor_segment_does_not_shadow_input_root() {
        let layout = OutputLayout::new(
            "/archive/Modified/input",
            "Modified",
            PlacementPolicy::Nested,
        )
        .unwrap();

        // The input root itself sits under a "Modified" ancestor; files
        // beneath it must still be walkable.
        assert!(!layout.is_inside_output(Path::new("/archive/Modified/input/A/x.xml")));
        assert!(layout.is_inside_output(Path::new(
            "/archive/Modified/input/Modified/A/x.xml"
        )));
    }
}

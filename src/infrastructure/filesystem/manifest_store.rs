use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs as async_fs;
use walkdir::WalkDir;

use crate::domain::entities::manifest::{ManifestDocument, ManifestDocumentError};
use crate::domain::entities::project_tree::DEFAULT_MANIFEST_FILE;
use crate::domain::value_objects::release_labels::ReleaseLabels;

/// Manifest store related errors
#[derive(Debug, Error)]
pub enum ManifestStoreError {
    #[error("Manifest file not found at path: {0}")]
    ManifestFileNotFound(String),

    #[error("Manifest file read failed for {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest file write failed for {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to overwrite the current manifest: {0}")]
    WouldOverwriteCurrent(String),

    #[error("Manifest directory scan failed: {0}")]
    DirectoryScanFailed(String),

    #[error("Invalid manifest {path}: {source}")]
    InvalidDocument {
        path: String,
        #[source]
        source: ManifestDocumentError,
    },
}

/// Reads and writes manifest XML files inside `.repo/manifests`.
pub struct ManifestStore {
    /// File name of the manifest the tree is synced to; never written
    current_manifest: String,
}

impl ManifestStore {
    pub fn new() -> Self {
        Self::with_current_manifest(DEFAULT_MANIFEST_FILE)
    }

    pub fn with_current_manifest(file_name: impl Into<String>) -> Self {
        Self {
            current_manifest: file_name.into(),
        }
    }

    pub fn current_manifest(&self) -> &str {
        &self.current_manifest
    }

    /// Read and parse a manifest file
    pub async fn read_manifest<P: AsRef<Path>>(
        &self,
        manifest_path: P,
    ) -> Result<ManifestDocument, ManifestStoreError> {
        let manifest_path = manifest_path.as_ref();

        if !manifest_path.is_file() {
            return Err(ManifestStoreError::ManifestFileNotFound(
                manifest_path.display().to_string(),
            ));
        }

        let content = async_fs::read_to_string(manifest_path)
            .await
            .map_err(|source| ManifestStoreError::ReadFailed {
                path: manifest_path.display().to_string(),
                source,
            })?;

        let document =
            ManifestDocument::parse(&content).map_err(|source| ManifestStoreError::InvalidDocument {
                path: manifest_path.display().to_string(),
                source,
            })?;

        tracing::debug!(
            "Read {} projects from {}",
            document.projects().len(),
            manifest_path.display()
        );

        Ok(document)
    }

    /// Serialize `document` to `manifest_path`. The current manifest is
    /// never overwritten; merging the result is a manual step.
    pub async fn write_manifest<P: AsRef<Path>>(
        &self,
        manifest_path: P,
        document: &ManifestDocument,
    ) -> Result<(), ManifestStoreError> {
        let manifest_path = manifest_path.as_ref();

        if manifest_path.file_name().and_then(|n| n.to_str()) == Some(self.current_manifest.as_str())
        {
            return Err(ManifestStoreError::WouldOverwriteCurrent(
                manifest_path.display().to_string(),
            ));
        }

        let content = document
            .render()
            .map_err(|source| ManifestStoreError::InvalidDocument {
                path: manifest_path.display().to_string(),
                source,
            })?;

        if let Some(parent) = manifest_path.parent() {
            if !parent.exists() {
                async_fs::create_dir_all(parent).await.map_err(|source| {
                    ManifestStoreError::WriteFailed {
                        path: parent.display().to_string(),
                        source,
                    }
                })?;
            }
        }

        async_fs::write(manifest_path, content)
            .await
            .map_err(|source| ManifestStoreError::WriteFailed {
                path: manifest_path.display().to_string(),
                source,
            })?;

        Ok(())
    }

    /// Manifests directly inside `manifests_dir` whose file name contains the
    /// previous release label, sorted by file name. The current manifest is
    /// excluded.
    pub fn previous_release_manifests<P: AsRef<Path>>(
        &self,
        manifests_dir: P,
        labels: &ReleaseLabels,
    ) -> Result<Vec<PathBuf>, ManifestStoreError> {
        let manifests_dir = manifests_dir.as_ref();
        if !manifests_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(manifests_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ManifestStoreError::DirectoryScanFailed(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = match entry.file_name().to_str() {
                Some(name) => name,
                None => continue,
            };

            if file_name != self.current_manifest
                && file_name.ends_with(".xml")
                && labels.matches_previous(file_name)
            {
                found.push(entry.path().to_path_buf());
            }
        }

        Ok(found)
    }
}

impl Default for ManifestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"<manifest><project name="a" path="a" upstream="v600/a"/></manifest>"#;

    #[tokio::test]
    async fn test_read_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("default.xml");
        std::fs::write(&path, MANIFEST).unwrap();

        let store = ManifestStore::new();
        let document = store.read_manifest(&path).await.unwrap();
        assert_eq!(document.projects().len(), 1);
    }

    #[tokio::test]
    async fn test_read_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let store = ManifestStore::new();
        let result = store.read_manifest(temp_dir.path().join("default.xml")).await;
        assert!(matches!(result, Err(ManifestStoreError::ManifestFileNotFound(_))));
    }

    #[tokio::test]
    async fn test_read_invalid_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("default.xml");
        std::fs::write(&path, "<manifest><project name=\"a\"></manifest>").unwrap();

        let result = ManifestStore::new().read_manifest(&path).await;
        assert!(matches!(result, Err(ManifestStoreError::InvalidDocument { .. })));
    }

    #[tokio::test]
    async fn test_write_refuses_current_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let document = ManifestDocument::parse(MANIFEST).unwrap();
        let store = ManifestStore::new();

        let result = store
            .write_manifest(temp_dir.path().join("default.xml"), &document)
            .await;
        assert!(matches!(result, Err(ManifestStoreError::WouldOverwriteCurrent(_))));
        assert!(!temp_dir.path().join("default.xml").exists());
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("manifests").join("v700_manifest.xml");
        let document = ManifestDocument::parse(MANIFEST).unwrap();

        ManifestStore::new()
            .write_manifest(&target, &document)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), MANIFEST);
    }

    #[test]
    fn test_previous_release_manifests_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in [
            "v600_z.xml",
            "default.xml",
            "v600_a.xml",
            "v500.xml",
            "v600_notes.txt",
            "v600_a.xml.orig",
        ] {
            std::fs::write(dir.join(name), MANIFEST).unwrap();
        }
        std::fs::create_dir_all(dir.join("v600_dir.xml")).unwrap();

        let labels = ReleaseLabels::new("v600", "v700").unwrap();
        let found = ManifestStore::new()
            .previous_release_manifests(dir, &labels)
            .unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["v600_a.xml", "v600_z.xml"]);
    }

    #[test]
    fn test_previous_release_manifests_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let labels = ReleaseLabels::new("v600", "v700").unwrap();
        let found = ManifestStore::new()
            .previous_release_manifests(temp_dir.path().join("absent"), &labels)
            .unwrap();
        assert!(found.is_empty());
    }
}

use super::manifest::Project;
use std::path::{Path, PathBuf};

/// Marker directory of a repo-managed source tree
pub const REPO_MARKER_DIR: &str = ".repo";

/// Name of the manifest the tree is currently synced to
pub const DEFAULT_MANIFEST_FILE: &str = "default.xml";

/// A repo-managed source tree rooted at the directory holding `.repo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTree {
    /// Directory containing the `.repo` marker
    pub root_path: PathBuf,
}

impl ProjectTree {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
        }
    }

    /// Walk upward from `start_path` to the first directory containing `.repo`.
    pub fn discover(start_path: &Path) -> Option<Self> {
        let mut current_path = start_path.to_path_buf();

        loop {
            if current_path.join(REPO_MARKER_DIR).is_dir() {
                return Some(Self::new(current_path));
            }

            tracing::debug!("No {} in {}", REPO_MARKER_DIR, current_path.display());

            match current_path.parent() {
                Some(parent) => current_path = parent.to_path_buf(),
                None => return None,
            }
        }
    }

    /// `.repo` directory
    pub fn repo_dir(&self) -> PathBuf {
        self.root_path.join(REPO_MARKER_DIR)
    }

    /// `.repo/manifests` directory
    pub fn manifests_dir(&self) -> PathBuf {
        self.repo_dir().join("manifests")
    }

    /// Path of a manifest file inside `.repo/manifests`
    pub fn manifest_path(&self, file_name: &str) -> PathBuf {
        self.manifests_dir().join(file_name)
    }

    /// Output manifest for `release`: `.repo/manifests/<release>_manifest.xml`
    pub fn release_manifest_path(&self, release: &str) -> PathBuf {
        self.manifest_path(&format!("{}_manifest.xml", release))
    }

    /// On-disk checkout of a manifest project
    pub fn project_dir(&self, project: &Project) -> PathBuf {
        self.root_path.join(project.checkout_path())
    }

    /// Path relative to the root for display, or the path itself when it
    /// lies outside the tree.
    pub fn display_path(&self, path: &Path) -> String {
        pathdiff::diff_paths(path, &self.root_path)
            .filter(|relative| !relative.starts_with(".."))
            .map(|relative| relative.display().to_string())
            .unwrap_or_else(|| path.display().to_string())
    }
}

use std::path::Path;

use crate::common::error::TaggerError;
use crate::common::result::TaggerResult;
use crate::domain::entities::project_tree::ProjectTree;

/// Find the repo-managed tree containing `start`.
///
/// Fails with [`TaggerError::ProjectRootNotFound`] when no ancestor of
/// `start` holds a `.repo` directory.
pub fn locate_project_root(start: &Path) -> TaggerResult<ProjectTree> {
    let tree = ProjectTree::discover(start)
        .ok_or_else(|| TaggerError::project_root_not_found(start))?;

    tracing::info!("Project root: {}", tree.root_path.display());
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::EXIT_USAGE;
    use tempfile::TempDir;

    #[test]
    fn test_locate_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join(".repo")).unwrap();
        let nested = temp_dir.path().join("vendor").join("lib");
        std::fs::create_dir_all(&nested).unwrap();

        let tree = locate_project_root(&nested).unwrap();
        assert_eq!(tree.root_path, temp_dir.path());
    }

    #[test]
    fn test_missing_root_maps_to_usage_exit_code() {
        let temp_dir = TempDir::new().unwrap();
        match locate_project_root(temp_dir.path()) {
            // Some CI sandboxes live inside a repo checkout
            Ok(tree) => assert_ne!(tree.root_path, temp_dir.path()),
            Err(error) => {
                assert!(matches!(error, TaggerError::ProjectRootNotFound { .. }));
                assert_eq!(error.exit_code(), EXIT_USAGE);
            }
        }
    }
}

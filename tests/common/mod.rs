//! Shared fixtures for integration tests: a repo-managed tree on disk whose
//! projects are real git repositories with bare `origin` remotes.

#![allow(dead_code)]

use git2::{Repository, Signature};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestTree {
    _temp_dir: TempDir,
    pub root: PathBuf,
    remotes_dir: PathBuf,
}

impl TestTree {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("tree");
        let remotes_dir = temp_dir.path().join("remotes");
        std::fs::create_dir_all(root.join(".repo").join("manifests")).unwrap();
        std::fs::create_dir_all(&remotes_dir).unwrap();

        Self {
            _temp_dir: temp_dir,
            root,
            remotes_dir,
        }
    }

    pub fn manifest_path(&self, file_name: &str) -> PathBuf {
        self.root.join(".repo").join("manifests").join(file_name)
    }

    pub fn write_manifest(&self, file_name: &str, content: &str) {
        std::fs::write(self.manifest_path(file_name), content).unwrap();
    }

    pub fn read_manifest(&self, file_name: &str) -> String {
        std::fs::read_to_string(self.manifest_path(file_name)).unwrap()
    }

    /// Checkout at `<root>/<path>` with one commit and a bare `origin`
    pub fn add_project_repo(&self, path: &str) -> PathBuf {
        let origin_path = self.remote_path(path);
        Repository::init_bare(&origin_path).unwrap();

        let checkout = self.root.join(path);
        let repo = Repository::init(&checkout).unwrap();
        {
            let signature = Signature::now("Release Bot", "release@example.com").unwrap();
            std::fs::write(checkout.join("README"), path).unwrap();
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("README")).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])
                .unwrap();
        }
        repo.remote("origin", origin_path.to_str().unwrap()).unwrap();

        checkout
    }

    /// Directory inside the tree that is not a repository
    pub fn add_plain_dir(&self, path: &str) -> PathBuf {
        let dir = self.root.join(path);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn remote_path(&self, path: &str) -> PathBuf {
        self.remotes_dir.join(format!("{}.git", path.replace('/', "_")))
    }

    pub fn remote_has_tag(&self, path: &str, tag: &str) -> bool {
        let origin = Repository::open_bare(self.remote_path(path)).unwrap();
        let found = origin.find_reference(&format!("refs/tags/{}", tag)).is_ok();
        found
    }

    pub fn remote_tag_count(&self, path: &str) -> usize {
        let origin = Repository::open_bare(self.remote_path(path)).unwrap();
        let count = origin.tag_names(None).unwrap().len();
        count
    }

    pub fn head_id(&self, path: &str) -> String {
        let repo = Repository::open(self.root.join(path)).unwrap();
        let id = repo.head().unwrap().peel_to_commit().unwrap().id().to_string();
        id
    }
}

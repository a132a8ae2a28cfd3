/// Infrastructure layer modules
///
/// Concrete implementations for external system interactions:
/// - Git tag operations (fetch, create, push) through libgit2
/// - Manifest files under `.repo/manifests`
/// - External commands such as `repo sync`
pub mod filesystem;
pub mod git;
pub mod process;

pub use filesystem::{ManifestStore, ManifestStoreError};
pub use git::{GitTagRepository, TagOperations, TagRepositoryError};
pub use process::{CommandExecutor, CommandExecutorError, ExecutionConfig};

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::build_name_map::BuildNameMapUseCase;
use super::locate_project_root::locate_project_root;
use super::rewrite_manifest::{RewriteManifestUseCase, RewriteReport};
use super::update_release_tags::{TagUpdateReport, UpdateReleaseTagsUseCase};
use crate::application::reporting::StatusReporter;
use crate::common::error::TaggerError;
use crate::common::result::TaggerResult;
use crate::domain::entities::name_map::NameMap;
use crate::domain::entities::project_tree::DEFAULT_MANIFEST_FILE;
use crate::domain::value_objects::release_labels::ReleaseLabels;
use crate::infrastructure::filesystem::ManifestStore;
use crate::infrastructure::git::{GitTagRepository, TagOperations};
use crate::infrastructure::process::{CommandExecutor, ExecutionConfig};

pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_SYNC_COMMAND: &str = "repo sync";

/// Final value written to each project's `revision`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinMode {
    /// The release tag name
    #[default]
    Tag,
    /// The commit id the release tag points to
    Hash,
}

/// Settings for one release tagging run
#[derive(Debug, Clone)]
pub struct ReleaseTaggingConfig {
    pub labels: ReleaseLabels,

    /// Report only; never create or push tags
    pub dry_run: bool,

    /// Remote fetched from and pushed to
    pub remote: String,

    /// Where the search for the project root starts
    pub start_dir: PathBuf,

    /// Repository that receives fallback tags
    pub current_repo: PathBuf,

    /// Current manifest file name inside `.repo/manifests`
    pub manifest_file: String,

    pub pin_mode: PinMode,

    /// Fallback-tag projects without a name map entry under their own name
    pub tag_unmapped: bool,

    /// Command run in the project root before anything else
    pub sync_command: Option<String>,

    /// Collect the sync command's output and replay it as status lines
    /// instead of letting it write to the terminal
    pub capture_sync_output: bool,
}

impl ReleaseTaggingConfig {
    /// Dry-run configuration rooted at `working_dir`, which is also the
    /// repository receiving fallback tags.
    pub fn new(labels: ReleaseLabels, working_dir: impl AsRef<Path>) -> Self {
        let working_dir = working_dir.as_ref().to_path_buf();
        Self {
            labels,
            dry_run: true,
            remote: DEFAULT_REMOTE.to_string(),
            start_dir: working_dir.clone(),
            current_repo: working_dir,
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            pin_mode: PinMode::default(),
            tag_unmapped: true,
            sync_command: None,
            capture_sync_output: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_current_repo(mut self, current_repo: impl AsRef<Path>) -> Self {
        self.current_repo = current_repo.as_ref().to_path_buf();
        self
    }

    pub fn with_manifest_file(mut self, manifest_file: impl Into<String>) -> Self {
        self.manifest_file = manifest_file.into();
        self
    }

    pub fn with_pin_mode(mut self, pin_mode: PinMode) -> Self {
        self.pin_mode = pin_mode;
        self
    }

    pub fn with_tag_unmapped(mut self, tag_unmapped: bool) -> Self {
        self.tag_unmapped = tag_unmapped;
        self
    }

    pub fn with_sync_command(mut self, sync_command: Option<String>) -> Self {
        self.sync_command = sync_command;
        self
    }

    pub fn with_capture_sync_output(mut self, capture_sync_output: bool) -> Self {
        self.capture_sync_output = capture_sync_output;
        self
    }

    /// Reject settings that cannot name a remote or a manifest file.
    pub fn validate(&self) -> TaggerResult<()> {
        if self.remote.trim().is_empty() {
            return Err(TaggerError::config_error("Remote name must not be empty"));
        }
        if self.manifest_file.is_empty()
            || self.manifest_file.contains(['/', '\\'])
            || matches!(self.manifest_file.as_str(), "." | "..")
        {
            return Err(TaggerError::config_error(format!(
                "Manifest must be a file name inside .repo/manifests, got '{}'",
                self.manifest_file
            )));
        }
        if let Some(command) = &self.sync_command {
            if command.trim().is_empty() {
                return Err(TaggerError::config_error("Sync command must not be empty"));
            }
        }
        Ok(())
    }
}

/// Everything a run did, for the end-of-run summary
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub release: String,
    pub previous_release: String,
    pub dry_run: bool,
    pub project_root: PathBuf,
    pub name_map: NameMap,
    pub tags: TagUpdateReport,
    pub manifest: RewriteReport,
}

/// Root lookup, optional sync, name map, tags, manifest rewrite.
pub struct ReleaseTaggingUseCase<G: TagOperations = GitTagRepository> {
    config: ReleaseTaggingConfig,
    git: G,
}

impl ReleaseTaggingUseCase<GitTagRepository> {
    pub fn new(config: ReleaseTaggingConfig) -> Self {
        Self::with_git(config, GitTagRepository::new())
    }
}

impl<G: TagOperations> ReleaseTaggingUseCase<G> {
    pub fn with_git(config: ReleaseTaggingConfig, git: G) -> Self {
        Self { config, git }
    }

    pub fn config(&self) -> &ReleaseTaggingConfig {
        &self.config
    }

    /// Run the whole pipeline. Only fatal conditions are returned as errors;
    /// per-project problems are part of the summary.
    pub async fn execute(&self, reporter: &mut dyn StatusReporter) -> TaggerResult<RunSummary> {
        self.config.validate()?;
        let tree = locate_project_root(&self.config.start_dir)?;

        if let Some(command) = &self.config.sync_command {
            reporter.info(&format!("Running {} in {}", command, tree.root_path.display()));
            let execution = ExecutionConfig::new()
                .with_working_directory(&tree.root_path)
                .with_output_capture(self.config.capture_sync_output);
            let result = CommandExecutor::execute_checked(command, &execution).await?;
            for line in result.stdout.lines().chain(result.stderr.lines()) {
                reporter.info(line);
            }
            tracing::info!("{} finished in {} ms", command, result.execution_time_ms);
        }

        let store = ManifestStore::with_current_manifest(&self.config.manifest_file);
        let current = store
            .read_manifest(tree.manifest_path(&self.config.manifest_file))
            .await?;

        let name_map = BuildNameMapUseCase::new(&store, &self.config.labels)
            .execute(&tree, &current, reporter)
            .await?;

        let tags = UpdateReleaseTagsUseCase::new(&self.config, &self.git).execute(
            &tree, &current, &name_map, reporter,
        );

        let manifest = RewriteManifestUseCase::new(&self.config, &self.git)
            .execute(&tree, &store, current, &name_map, &tags, reporter)
            .await?;

        Ok(RunSummary {
            release: self.config.labels.new_release().to_string(),
            previous_release: self.config.labels.previous().to_string(),
            dry_run: self.config.dry_run,
            project_root: tree.root_path,
            name_map,
            tags,
            manifest,
        })
    }
}

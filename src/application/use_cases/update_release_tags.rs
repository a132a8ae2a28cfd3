use serde::Serialize;
use std::path::{Path, PathBuf};

use super::release_tagging::ReleaseTaggingConfig;
use crate::application::reporting::StatusReporter;
use crate::domain::entities::manifest::ManifestDocument;
use crate::domain::entities::name_map::NameMap;
use crate::domain::entities::project_tree::ProjectTree;
use crate::infrastructure::git::{TagOperations, TagRepositoryError};

/// How a manifest project relates to the name map and the checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectClass {
    /// Mapped, checkout is a git repository
    Present,
    /// Mapped, checkout does not exist
    Missing,
    /// Mapped, checkout exists without `.git`
    Invalid,
    /// No name map entry
    Unmapped,
}

/// What happened to a single tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum TagAction {
    AlreadyExists,
    Created,
    /// Dry-run: the tag is missing and would be created
    WouldCreate,
    InvalidRepository,
    Failed(String),
    /// Nothing was attempted
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagOutcome {
    pub project: String,
    pub class: ProjectClass,
    pub tag: Option<String>,
    /// Repository the tag was looked up in
    pub repo_path: Option<PathBuf>,
    pub fallback: bool,
    pub action: TagAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagUpdateReport {
    pub outcomes: Vec<TagOutcome>,
}

impl TagUpdateReport {
    pub fn outcome(&self, project: &str) -> Option<&TagOutcome> {
        self.outcomes.iter().find(|o| o.project == project)
    }

    pub fn count(&self, action: &TagAction) -> usize {
        self.outcomes.iter().filter(|o| &o.action == action).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TagOutcome> {
        self.outcomes.iter().filter(|o| {
            matches!(o.action, TagAction::Failed(_) | TagAction::InvalidRepository)
        })
    }
}

/// Makes sure every manifest project has its release tag somewhere.
pub struct UpdateReleaseTagsUseCase<'a, G: TagOperations> {
    config: &'a ReleaseTaggingConfig,
    git: &'a G,
}

impl<'a, G: TagOperations> UpdateReleaseTagsUseCase<'a, G> {
    pub fn new(config: &'a ReleaseTaggingConfig, git: &'a G) -> Self {
        Self { config, git }
    }

    /// Classify every project of `manifest` and tag it accordingly.
    /// Per-project failures are reported and recorded, never returned.
    pub fn execute(
        &self,
        tree: &ProjectTree,
        manifest: &ManifestDocument,
        name_map: &NameMap,
        reporter: &mut dyn StatusReporter,
    ) -> TagUpdateReport {
        reporter.header("-== UPDATING TAGS ==-");
        if self.config.dry_run {
            reporter.warning("Dry run, to create tags add --apply argument");
        }

        let current_repo = self.config.current_repo.as_path();
        let mut report = TagUpdateReport::default();

        for project in manifest.projects() {
            let project_dir = tree.project_dir(project);

            let outcome = match name_map.get(&project.name) {
                Some(tag) if !project_dir.exists() => {
                    reporter.warning(&format!(
                        "Project path does not exist: {}. Creating tag in current project.",
                        tree.display_path(&project_dir)
                    ));
                    TagOutcome {
                        project: project.name.clone(),
                        class: ProjectClass::Missing,
                        tag: Some(tag.to_string()),
                        repo_path: Some(current_repo.to_path_buf()),
                        fallback: true,
                        action: self.update_release_tag(current_repo, tag, true, reporter),
                    }
                }
                Some(tag) if !self.git.is_repository(&project_dir) => {
                    reporter.failure(&format!(
                        "Not a valid Git repository: {}",
                        tree.display_path(&project_dir)
                    ));
                    TagOutcome {
                        project: project.name.clone(),
                        class: ProjectClass::Invalid,
                        tag: Some(tag.to_string()),
                        repo_path: None,
                        fallback: false,
                        action: TagAction::InvalidRepository,
                    }
                }
                Some(tag) => {
                    reporter.info(&format!("Updating tag for project: {}", project.name));
                    TagOutcome {
                        project: project.name.clone(),
                        class: ProjectClass::Present,
                        tag: Some(tag.to_string()),
                        repo_path: Some(project_dir.clone()),
                        fallback: false,
                        action: self.update_release_tag(&project_dir, tag, false, reporter),
                    }
                }
                None => {
                    reporter.failure(&format!(
                        "No tag mapping found for project: {}",
                        project.name
                    ));
                    if self.config.tag_unmapped {
                        TagOutcome {
                            project: project.name.clone(),
                            class: ProjectClass::Unmapped,
                            tag: Some(project.name.clone()),
                            repo_path: Some(current_repo.to_path_buf()),
                            fallback: true,
                            action: self.update_release_tag(
                                current_repo,
                                &project.name,
                                true,
                                reporter,
                            ),
                        }
                    } else {
                        TagOutcome {
                            project: project.name.clone(),
                            class: ProjectClass::Unmapped,
                            tag: None,
                            repo_path: None,
                            fallback: false,
                            action: TagAction::Skipped,
                        }
                    }
                }
            };

            report.outcomes.push(outcome);
        }

        report
    }

    /// Create and push `tag` in `repo_path` unless it already exists.
    ///
    /// Never fails: an invalid repository and any git error end up in the
    /// returned action and on the reporter.
    pub fn update_release_tag(
        &self,
        repo_path: &Path,
        tag: &str,
        fallback: bool,
        reporter: &mut dyn StatusReporter,
    ) -> TagAction {
        if !self.git.is_repository(repo_path) {
            reporter.failure(&format!(
                "Not a valid Git repository: {}",
                repo_path.display()
            ));
            return TagAction::InvalidRepository;
        }

        match self.try_update_release_tag(repo_path, tag, fallback, reporter) {
            Ok(action) => action,
            Err(e) => {
                tracing::debug!("Tagging {} in {} failed: {:?}", tag, repo_path.display(), e);
                reporter.warning(&format!(
                    "{} is missing or broken: {}",
                    repo_path.display(),
                    e
                ));
                TagAction::Failed(e.to_string())
            }
        }
    }

    fn try_update_release_tag(
        &self,
        repo_path: &Path,
        tag: &str,
        fallback: bool,
        reporter: &mut dyn StatusReporter,
    ) -> Result<TagAction, TagRepositoryError> {
        let remote = self.config.remote.as_str();
        self.git.fetch_tags(repo_path, remote)?;

        if self.git.tag_exists(repo_path, tag)? {
            let repo_name = repo_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| repo_path.display().to_string());
            reporter.info(&format!("{} -> tag {} already exists", repo_name, tag));
            return Ok(TagAction::AlreadyExists);
        }

        let kind = if fallback { "fallback tag" } else { "tag" };
        reporter.info(&format!(
            "Creating {} {} in {}",
            kind,
            tag,
            repo_path.display()
        ));

        if self.config.dry_run {
            return Ok(TagAction::WouldCreate);
        }

        let commit = self.git.create_tag(repo_path, tag)?;
        self.git.push_tag(repo_path, remote, tag)?;
        reporter.success(&format!(
            "Pushed {} ({}) to {}",
            tag,
            &commit[..commit.len().min(12)],
            remote
        ));

        Ok(TagAction::Created)
    }
}

use serde::Serialize;
use std::path::PathBuf;

use super::release_tagging::{PinMode, ReleaseTaggingConfig};
use super::update_release_tags::{ProjectClass, TagUpdateReport};
use crate::application::reporting::StatusReporter;
use crate::common::result::TaggerResult;
use crate::domain::entities::manifest::{ManifestDocument, Project};
use crate::domain::entities::name_map::NameMap;
use crate::domain::entities::project_tree::ProjectTree;
use crate::infrastructure::filesystem::ManifestStore;
use crate::infrastructure::git::TagOperations;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RevisionChange {
    Updated { from: Option<String>, to: String },
    Unchanged { revision: String },
    /// No name map entry, revision kept
    Unmapped,
    /// Checkout is not a repository, revision kept
    SkippedInvalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionUpdate {
    pub project: String,
    #[serde(flatten)]
    pub change: RevisionChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    pub output_path: PathBuf,
    pub updates: Vec<RevisionUpdate>,
}

impl RewriteReport {
    pub fn update(&self, project: &str) -> Option<&RevisionChange> {
        self.updates
            .iter()
            .find(|u| u.project == project)
            .map(|u| &u.change)
    }

    pub fn updated_count(&self) -> usize {
        self.updates
            .iter()
            .filter(|u| matches!(u.change, RevisionChange::Updated { .. }))
            .count()
    }
}

/// Pins every mapped project's `revision` to its release tag and writes the
/// result to `<release>_manifest.xml` next to the current manifest.
pub struct RewriteManifestUseCase<'a, G: TagOperations> {
    config: &'a ReleaseTaggingConfig,
    git: &'a G,
}

impl<'a, G: TagOperations> RewriteManifestUseCase<'a, G> {
    pub fn new(config: &'a ReleaseTaggingConfig, git: &'a G) -> Self {
        Self { config, git }
    }

    /// Update revisions in `manifest` in place
    pub fn apply(
        &self,
        manifest: &mut ManifestDocument,
        name_map: &NameMap,
        tags: &TagUpdateReport,
        reporter: &mut dyn StatusReporter,
    ) -> Vec<RevisionUpdate> {
        reporter.header("-== UPDATING MANIFEST ==-");

        let projects: Vec<Project> = manifest.projects().to_vec();
        let mut updates = Vec::with_capacity(projects.len());

        for project in projects {
            let change = match name_map.get(&project.name) {
                None => {
                    tracing::debug!("{} is not mapped, keeping its revision", project.name);
                    RevisionChange::Unmapped
                }
                Some(_)
                    if tags
                        .outcome(&project.name)
                        .map_or(false, |o| o.class == ProjectClass::Invalid) =>
                {
                    reporter.warning(&format!(
                        "Skipping {}, not a valid Git repository",
                        project.name
                    ));
                    RevisionChange::SkippedInvalid
                }
                Some(tag) => {
                    let target = self.target_revision(&project, tag, tags, reporter);
                    manifest.set_revision(&project.name, target.clone());

                    if project.revision.as_deref() == Some(target.as_str()) {
                        reporter.info(&format!("Skipping {}, already at {}", project.name, target));
                        RevisionChange::Unchanged { revision: target }
                    } else {
                        reporter.success(&format!("Updating {} to {}", project.name, target));
                        RevisionChange::Updated {
                            from: project.revision.clone(),
                            to: target,
                        }
                    }
                }
            };

            updates.push(RevisionUpdate {
                project: project.name.clone(),
                change,
            });
        }

        updates
    }

    /// Rewrite `manifest` and write it to the release manifest path
    pub async fn execute(
        &self,
        tree: &ProjectTree,
        store: &ManifestStore,
        mut manifest: ManifestDocument,
        name_map: &NameMap,
        tags: &TagUpdateReport,
        reporter: &mut dyn StatusReporter,
    ) -> TaggerResult<RewriteReport> {
        let updates = self.apply(&mut manifest, name_map, tags, reporter);

        let output_path = tree.release_manifest_path(self.config.labels.new_release());
        store.write_manifest(&output_path, &manifest).await?;

        reporter.success(&format!(
            "New manifest is created in {}",
            output_path.display()
        ));
        reporter.success(&format!(
            "Manual merge step to {} is still required",
            store.current_manifest()
        ));

        Ok(RewriteReport {
            output_path,
            updates,
        })
    }

    /// Tag name, or in hash mode the commit the tag points to in the
    /// repository that carries it. Falls back to the tag name when the
    /// commit cannot be resolved (e.g. the tag was not created in dry-run).
    fn target_revision(
        &self,
        project: &Project,
        tag: &str,
        tags: &TagUpdateReport,
        reporter: &mut dyn StatusReporter,
    ) -> String {
        if self.config.pin_mode == PinMode::Tag {
            return tag.to_string();
        }

        let repo_path = match tags.outcome(&project.name).and_then(|o| o.repo_path.as_deref()) {
            Some(path) => path,
            None => return tag.to_string(),
        };

        match self.git.resolve_tag(repo_path, tag) {
            Ok(commit) => commit,
            Err(e) => {
                reporter.warning(&format!(
                    "Cannot resolve {} for {}, pinning the tag name: {}",
                    tag, project.name, e
                ));
                tag.to_string()
            }
        }
    }
}

use std::path::PathBuf;

use crate::application::reporting::StatusReporter;
use crate::common::result::TaggerResult;
use crate::domain::entities::manifest::ManifestDocument;
use crate::domain::entities::name_map::NameMap;
use crate::domain::entities::project_tree::ProjectTree;
use crate::domain::value_objects::release_labels::ReleaseLabels;
use crate::infrastructure::filesystem::ManifestStore;

/// Accumulates `project name -> tag name` entries from manifests.
///
/// The tag name is the project's `upstream` attribute with the previous
/// release label replaced by the new one. Projects without `upstream` are
/// left out. Manifests added later overwrite entries of earlier ones.
#[derive(Debug, Clone)]
pub struct NameMapBuilder {
    labels: ReleaseLabels,
    entries: Vec<(String, String)>,
}

impl NameMapBuilder {
    pub fn new(labels: ReleaseLabels) -> Self {
        Self {
            labels,
            entries: Vec::new(),
        }
    }

    pub fn add_manifest(&mut self, manifest: &ManifestDocument) -> &mut Self {
        for project in manifest.projects() {
            match &project.upstream {
                Some(upstream) => {
                    let tag = self.labels.substitute(upstream);
                    tracing::debug!("{} -> {}", project.name, tag);
                    self.entries.push((project.name.clone(), tag));
                }
                None => tracing::debug!("{} has no upstream, not mapped", project.name),
            }
        }
        self
    }

    pub fn build(self) -> NameMap {
        self.entries.into_iter().collect()
    }
}

/// Loads the name-map sources of a tree: the current manifest first, then
/// every manifest named after the previous release in file-name order.
pub struct BuildNameMapUseCase<'a> {
    store: &'a ManifestStore,
    labels: &'a ReleaseLabels,
}

impl<'a> BuildNameMapUseCase<'a> {
    pub fn new(store: &'a ManifestStore, labels: &'a ReleaseLabels) -> Self {
        Self { store, labels }
    }

    /// Additional manifests consulted after the current one. The manifest
    /// an earlier run wrote for the new release is never an input.
    pub fn previous_release_sources(&self, tree: &ProjectTree) -> TaggerResult<Vec<PathBuf>> {
        let own_output = tree.release_manifest_path(self.labels.new_release());
        let mut sources = self
            .store
            .previous_release_manifests(tree.manifests_dir(), self.labels)?;
        sources.retain(|path| *path != own_output);
        Ok(sources)
    }

    /// Build the map. A previous-release manifest that cannot be read is
    /// reported and skipped; the current manifest has already been parsed.
    pub async fn execute(
        &self,
        tree: &ProjectTree,
        current: &ManifestDocument,
        reporter: &mut dyn StatusReporter,
    ) -> TaggerResult<NameMap> {
        let mut builder = NameMapBuilder::new(self.labels.clone());
        builder.add_manifest(current);

        for path in self.previous_release_sources(tree)? {
            match self.store.read_manifest(&path).await {
                Ok(manifest) => {
                    tracing::info!("Reading tag names from {}", path.display());
                    builder.add_manifest(&manifest);
                }
                Err(e) => reporter.warning(&format!(
                    "Ignoring manifest {}: {}",
                    tree.display_path(&path),
                    e
                )),
            }
        }

        let name_map = builder.build();
        tracing::info!("Resolved {} tag names ({})", name_map.len(), self.labels);
        Ok(name_map)
    }
}

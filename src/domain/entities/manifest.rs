//! `repo`-style XML manifest: the ordered list of projects plus the original
//! document text, so that a rewrite only touches `revision` attributes.

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;
use thiserror::Error;

const PROJECT_TAG: &[u8] = b"project";
const REVISION_ATTR: &str = "revision";

/// Manifest document related errors
#[derive(Debug, Error)]
pub enum ManifestDocumentError {
    #[error("Error parsing manifest XML: {0}")]
    Parse(String),

    #[error("Invalid attribute in <project>: {0}")]
    InvalidAttribute(String),

    #[error("Error writing manifest XML: {0}")]
    Write(String),

    #[error("Manifest is not valid UTF-8: {0}")]
    Encoding(String),
}

/// A `<project>` entry. Every attribute except `name` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Unique project name
    pub name: String,

    /// Checkout location relative to the project root
    pub path: Option<String>,

    /// Pinned commit, branch or tag
    pub revision: Option<String>,

    /// Template used to derive the release tag name
    pub upstream: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            revision: None,
            upstream: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn with_upstream(mut self, upstream: impl Into<String>) -> Self {
        self.upstream = Some(upstream.into());
        self
    }

    /// Location of the checkout relative to the root: `path`, or `name` when
    /// the manifest omits it (the `repo` tool's default).
    pub fn checkout_path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }
}

/// Parsed manifest that can be re-serialized with updated revisions.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    source: String,
    projects: Vec<Project>,
}

impl ManifestDocument {
    /// Parse a manifest from XML content
    pub fn parse(xml: &str) -> Result<Self, ManifestDocumentError> {
        let mut reader = Reader::from_str(xml);
        let mut projects = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                    if e.name().as_ref() == PROJECT_TAG =>
                {
                    match parse_project(e)? {
                        Some(project) => projects.push(project),
                        None => tracing::warn!("Ignoring <project> without a name attribute"),
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ManifestDocumentError::Parse(e.to_string())),
                _ => {}
            }
        }

        Ok(Self {
            source: xml.to_string(),
            projects,
        })
    }

    /// Projects in document order
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn find_project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Set the revision of every project called `name`. Returns whether a
    /// project with that name exists.
    pub fn set_revision(&mut self, name: &str, revision: impl Into<String>) -> bool {
        let revision = revision.into();
        let mut found = false;
        for project in self.projects.iter_mut().filter(|p| p.name == name) {
            project.revision = Some(revision.clone());
            found = true;
        }
        found
    }

    /// Serialize the document. Elements other than `<project>` are copied
    /// through untouched; a `<project>` is rebuilt only when its revision
    /// changed, keeping its other attributes in their original order.
    pub fn render(&self) -> Result<String, ManifestDocumentError> {
        let mut reader = Reader::from_str(&self.source);
        let mut writer = Writer::new(Vec::new());

        loop {
            let event = reader
                .read_event()
                .map_err(|e| ManifestDocumentError::Parse(e.to_string()))?;

            let event = match event {
                Event::Eof => break,
                Event::Start(e) if e.name().as_ref() == PROJECT_TAG => {
                    Event::Start(self.rewrite_project_element(e)?)
                }
                Event::Empty(e) if e.name().as_ref() == PROJECT_TAG => {
                    Event::Empty(self.rewrite_project_element(e)?)
                }
                other => other,
            };

            writer
                .write_event(event)
                .map_err(|e| ManifestDocumentError::Write(e.to_string()))?;
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| ManifestDocumentError::Encoding(e.to_string()))
    }

    fn rewrite_project_element<'a>(
        &self,
        element: BytesStart<'a>,
    ) -> Result<BytesStart<'a>, ManifestDocumentError> {
        let name = match get_attr(&element, b"name")? {
            Some(name) => name,
            None => return Ok(element),
        };
        let target = match self.find_project(&name).and_then(|p| p.revision.as_deref()) {
            Some(revision) => revision,
            None => return Ok(element),
        };
        if get_attr(&element, REVISION_ATTR.as_bytes())?.as_deref() == Some(target) {
            return Ok(element);
        }

        let mut rebuilt = BytesStart::new("project");
        let mut replaced = false;
        for attr in element.attributes() {
            let attr = attr.map_err(|e| ManifestDocumentError::InvalidAttribute(e.to_string()))?;
            if attr.key.as_ref() == REVISION_ATTR.as_bytes() {
                rebuilt.push_attribute(Attribute::from((REVISION_ATTR, target)));
                replaced = true;
            } else {
                rebuilt.push_attribute(attr);
            }
        }
        if !replaced {
            rebuilt.push_attribute(Attribute::from((REVISION_ATTR, target)));
        }

        Ok(rebuilt)
    }
}

fn get_attr(e: &BytesStart, name: &[u8]) -> Result<Option<String>, ManifestDocumentError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ManifestDocumentError::InvalidAttribute(e.to_string()))?;
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|e| ManifestDocumentError::InvalidAttribute(e.to_string()))?;
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

fn parse_project(e: &BytesStart) -> Result<Option<Project>, ManifestDocumentError> {
    let name = match get_attr(e, b"name")? {
        Some(name) => name,
        None => return Ok(None),
    };

    Ok(Some(Project {
        name,
        path: get_attr(e, b"path")?,
        revision: get_attr(e, REVISION_ATTR.as_bytes())?,
        upstream: get_attr(e, b"upstream")?,
    }))
}

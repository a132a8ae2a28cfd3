use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// ReleaseLabels related errors
#[derive(Debug, Error, PartialEq)]
pub enum ReleaseLabelError {
    #[error("Release label cannot be empty")]
    EmptyRelease,

    #[error("Previous release label cannot be empty")]
    EmptyPrevious,
}

/// Previous/new release label pair.
///
/// Labels are opaque tokens; the only thing done with them is textual
/// substitution of `previous` by `new` inside manifest attribute values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseLabels {
    previous: String,
    new: String,
}

impl ReleaseLabels {
    pub fn new(
        previous: impl Into<String>,
        new: impl Into<String>,
    ) -> Result<Self, ReleaseLabelError> {
        let previous = previous.into();
        let new = new.into();

        if new.is_empty() {
            return Err(ReleaseLabelError::EmptyRelease);
        }
        if previous.is_empty() {
            return Err(ReleaseLabelError::EmptyPrevious);
        }

        Ok(Self { previous, new })
    }

    /// Build labels from command line values; a missing previous label means
    /// "no rename", i.e. previous equals the new release.
    pub fn from_cli(release: &str, previous: Option<&str>) -> Result<Self, ReleaseLabelError> {
        Self::new(previous.unwrap_or(release), release)
    }

    pub fn previous(&self) -> &str {
        &self.previous
    }

    pub fn new_release(&self) -> &str {
        &self.new
    }

    /// Whether the run renames tags or only makes sure they exist.
    pub fn is_rename(&self) -> bool {
        self.previous != self.new
    }

    /// Replace every occurrence of the previous label with the new one.
    pub fn substitute(&self, value: &str) -> String {
        value.replace(&self.previous, &self.new)
    }

    /// Whether a manifest file name refers to the previous release.
    pub fn matches_previous(&self, file_name: &str) -> bool {
        file_name.contains(&self.previous)
    }
}

impl fmt::Display for ReleaseLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.previous, self.new)
    }
}

use serde::Serialize;
use std::collections::BTreeMap;

/// Resolved mapping from project name to release tag name.
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NameMap {
    entries: BTreeMap<String, String>,
}

impl NameMap {
    pub fn get(&self, project_name: &str) -> Option<&str> {
        self.entries.get(project_name).map(String::as_str)
    }

    pub fn contains(&self, project_name: &str) -> bool {
        self.entries.contains_key(project_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for NameMap {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

/// Later pairs overwrite earlier ones with the same project name.
impl FromIterator<(String, String)> for NameMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

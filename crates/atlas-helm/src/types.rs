//! Release store types.

use std::collections::BTreeMap;

/// Installed releases, keyed by release name, mapping to their namespace.
///
/// Built once per command and never mutated afterwards. A missing name is not
/// an error, it only means there is no corresponding job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseMap {
    releases: BTreeMap<String, String>,
}

impl ReleaseMap {
    /// Namespace of the named release.
    pub fn namespace_of(&self, name: &str) -> Option<&str> {
        self.releases.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.releases.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Iterate `(name, namespace)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.releases
            .iter()
            .map(|(name, ns)| (name.as_str(), ns.as_str()))
    }
}

impl FromIterator<(String, String)> for ReleaseMap {
    /// Later entries win when a name repeats.
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            releases: iter.into_iter().collect(),
        }
    }
}

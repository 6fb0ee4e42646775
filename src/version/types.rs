//! Common types for the version layer

use std::collections::{BTreeSet, HashMap};

/// Dist-tag that points at the version a registry considers current
pub const LATEST_TAG: &str = "latest";

/// Package metadata as published by an npm-compatible registry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageMetadata {
    /// Package name (e.g., "lodash", "@types/node")
    pub name: String,
    /// Named pointers to published versions (e.g., {"latest": "4.17.21"})
    pub dist_tags: HashMap<String, String>,
    /// Every published version string
    pub versions: BTreeSet<String>,
}

impl PackageMetadata {
    pub fn new(
        name: impl Into<String>,
        dist_tags: HashMap<String, String>,
        versions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            name: name.into(),
            dist_tags,
            versions: versions.into_iter().collect(),
        }
    }

    /// Version the `latest` dist-tag points at
    pub fn latest(&self) -> Option<&str> {
        self.dist_tags.get(LATEST_TAG).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_reads_dist_tag() {
        let metadata = PackageMetadata::new(
            "lodash",
            HashMap::from([
                ("latest".to_string(), "4.17.21".to_string()),
                ("next".to_string(), "5.0.0-rc.1".to_string()),
            ]),
            ["4.17.21".to_string(), "5.0.0-rc.1".to_string()],
        );

        assert_eq!(metadata.latest(), Some("4.17.21"));
    }

    #[test]
    fn latest_is_none_without_dist_tag() {
        let metadata = PackageMetadata::new("lodash", HashMap::new(), ["1.0.0".to_string()]);

        assert_eq!(metadata.latest(), None);
    }
}

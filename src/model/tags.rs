use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The user-wide master list of tag slugs, kept sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCatalog {
    #[serde(default)]
    pub slugs: BTreeSet<String>,
}

impl TagCatalog {
    pub fn contains(&self, slug: &str) -> bool {
        self.slugs.contains(slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.slugs.iter().map(String::as_str)
    }
}

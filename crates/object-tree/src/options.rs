//! Tree configuration.

use serde::{Deserialize, Serialize};

/// Options shared by every node of a tree.
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    /// How many times a set traversal restarts after the set changed under it
    /// before giving up.
    pub set_retries: usize,
    /// Remember wrapped child nodes (weakly) so repeated descent returns the
    /// same node.
    pub cache_children: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            set_retries: 2,
            cache_children: true,
        }
    }
}

impl TreeOptions {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_set_retries(mut self, retries: usize) -> Self {
        self.set_retries = retries;
        self
    }

    pub fn with_cache_children(mut self, cache: bool) -> Self {
        self.cache_children = cache;
        self
    }
}

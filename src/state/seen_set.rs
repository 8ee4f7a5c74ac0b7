use crate::record::IdentityKey;
use std::collections::HashSet;

/// Identity keys already accepted during one crawl run
///
/// Comparison is exact typed equality. Near-duplicates that differ only in
/// whitespace or case are treated as distinct records, and so are a number
/// and text that render alike.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    keys: HashSet<IdentityKey>,
}

impl SeenSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `key` has not been accepted yet
    pub fn is_new(&self, key: &IdentityKey) -> bool {
        !self.keys.contains(key)
    }

    /// Records `key` as accepted
    pub fn mark_seen(&mut self, key: impl Into<IdentityKey>) {
        self.keys.insert(key.into());
    }

    /// Number of distinct keys accepted so far
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

use crate::listing::{DedupKey, JobListing};
use std::collections::HashSet;

/// Set of dedup keys already seen, owned by the run coordinator
///
/// Seeded from the rows already in the store so that a rerun over the
/// same results adds nothing, then grown as new listings are accepted.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: HashSet<DedupKey>,
}

impl DedupSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set pre-populated with previously persisted keys
    pub fn with_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = DedupKey>,
    {
        Self {
            seen: keys.into_iter().collect(),
        }
    }

    /// Records the listing's key
    ///
    /// Returns `true` if the listing is new, `false` for a repeated key
    pub fn insert(&mut self, listing: &JobListing) -> bool {
        self.seen.insert(listing.dedup_key())
    }

    /// Checks membership without recording anything
    pub fn contains(&self, key: &DedupKey) -> bool {
        self.seen.contains(key)
    }

    /// Number of distinct keys known
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

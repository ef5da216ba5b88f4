//! Match collection with primary-key deduplication.

use std::collections::HashSet;

use crate::model::ClassifiedRecord;

/// Append-only set of matches keyed by primary key.
///
/// The first record seen for a key wins; later records with the same key
/// are ignored. Records are reported in insertion order.
#[derive(Debug, Default)]
pub struct ResultCollector {
    seen: HashSet<String>,
    matches: Vec<ClassifiedRecord>,
}

impl ResultCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record unless its primary key is already present.
    ///
    /// Returns `true` when the record was inserted.
    pub fn add(&mut self, record: ClassifiedRecord) -> bool {
        if !self.seen.insert(record.primary_key.clone()) {
            return false;
        }
        self.matches.push(record);
        true
    }

    /// Number of distinct matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether nothing has matched yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Matches collected so far, in insertion order.
    #[must_use]
    pub fn matches(&self) -> &[ClassifiedRecord] {
        &self.matches
    }

    /// Consumes the collector and returns the matches in insertion order.
    #[must_use]
    pub fn finalize(self) -> Vec<ClassifiedRecord> {
        self.matches
    }
}

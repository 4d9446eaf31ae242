//! Once-per-collision bookkeeping for event histograms.

use std::collections::HashSet;

/// Collisions already credited with event-histogram fills.
#[derive(Debug, Clone, Default)]
pub struct EventDeduplicator {
    seen: HashSet<usize>,
}

impl EventDeduplicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `collision` and returns true if it was not seen before.
    pub fn first_encounter(&mut self, collision: usize) -> bool {
        self.seen.insert(collision)
    }

    /// Number of distinct collisions credited so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

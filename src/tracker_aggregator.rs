//! Groups (domain, pattern) pairs by tracker identifier.
//!
//! Every contribution is a set union, so row order and repeated rows do not
//! change the final state.

use crate::domain_aggregator::DomainAggregator;
use crate::path_pattern::PathPattern;
use std::collections::BTreeMap;

/// All domains and patterns contributed to one tracker id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerPatternGroup {
    pub tracker_id: String,
    pub domains: DomainAggregator,
}

impl TrackerPatternGroup {
    pub fn new(tracker_id: impl Into<String>) -> Self {
        Self {
            tracker_id: tracker_id.into(),
            domains: DomainAggregator::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrackerAggregator {
    groups: BTreeMap<String, TrackerPatternGroup>,
}

impl TrackerAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union every (domain, pattern) pair into each listed tracker's group.
    ///
    /// A tracker id seen with no patterns still gets a group; an empty id
    /// list contributes nothing.
    pub fn add_row<S: AsRef<str>>(&mut self, tracker_ids: &[S], domain: &str, patterns: &[PathPattern]) {
        for id in tracker_ids {
            let id = id.as_ref().trim();
            if id.is_empty() {
                continue;
            }

            let group = self
                .groups
                .entry(id.to_string())
                .or_insert_with(|| TrackerPatternGroup::new(id));

            for pattern in patterns {
                group.domains.add_observation(domain, pattern.clone());
            }
        }
    }

    pub fn get(&self, tracker_id: &str) -> Option<&TrackerPatternGroup> {
        self.groups.get(tracker_id)
    }

    /// Tracker ids in output order
    pub fn tracker_ids(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Consume the aggregator, yielding groups sorted by tracker id
    pub fn into_groups(self) -> Vec<TrackerPatternGroup> {
        self.groups.into_values().collect()
    }
}

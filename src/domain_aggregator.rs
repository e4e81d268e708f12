//! Per-domain pattern accumulation.
//!
//! Domains are keyed by their core (one leading `www.` removed) so that
//! `www.example.com` and `example.com` share a pattern set.

use crate::path_pattern::PathPattern;
use std::collections::{BTreeMap, BTreeSet};

const WWW_PREFIX: &str = "www.";

/// Remove one literal leading `www.` and nothing else
pub fn strip_www(domain: &str) -> &str {
    domain.strip_prefix(WWW_PREFIX).unwrap_or(domain)
}

/// Unique patterns observed under one domain core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPatternSet {
    pub core: String,
    pub patterns: BTreeSet<PathPattern>,
}

impl DomainPatternSet {
    pub fn new(core: impl Into<String>) -> Self {
        Self {
            core: core.into(),
            patterns: BTreeSet::new(),
        }
    }

    /// Sorted, deduplicated patterns
    pub fn finalize(&self) -> Vec<PathPattern> {
        self.patterns.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainAggregator {
    sets: BTreeMap<String, DomainPatternSet>,
}

impl DomainAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `pattern` under the domain's core; empty cores are ignored
    pub fn add_observation(&mut self, domain: &str, pattern: PathPattern) {
        let core = strip_www(domain.trim());
        if core.is_empty() {
            return;
        }

        self.sets
            .entry(core.to_string())
            .or_insert_with(|| DomainPatternSet::new(core))
            .patterns
            .insert(pattern);
    }

    /// Sorted unique patterns for one domain core (empty if unseen)
    pub fn finalize(&self, domain_core: &str) -> Vec<PathPattern> {
        self.sets
            .get(domain_core)
            .map(DomainPatternSet::finalize)
            .unwrap_or_default()
    }

    /// Domain cores in sorted order
    pub fn domain_cores(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Consume the aggregator: domain core -> sorted unique patterns
    pub fn into_finalized(self) -> BTreeMap<String, Vec<PathPattern>> {
        self.sets
            .into_iter()
            .map(|(core, set)| (core, set.patterns.into_iter().collect()))
            .collect()
    }
}

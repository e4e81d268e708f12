//! Raw observations -> per-domain inventory.
//!
//! Paths are collected for every domain first. Only once the batch is closed
//! does `finish` build each domain's frequency table and then its patterns,
//! so a segment's literal status never depends on row order.

use crate::path_pattern::{PathPattern, PathPatternBuilder};
use crate::records::{InventoryRecord, PathObservation};
use crate::segment_classifier::{KeywordSet, SegmentFrequencyTable};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
struct DomainObservations {
    tracker_ids: BTreeSet<String>,
    campaign_ids: BTreeSet<String>,
    paths: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DomainInventory {
    domains: BTreeMap<String, DomainObservations>,
    skipped: usize,
}

impl DomainInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, observation: PathObservation) {
        if observation.domain.is_empty() {
            warn!("Skipping observation without a domain: {}", observation.path);
            self.skipped += 1;
            return;
        }

        let entry = self.domains.entry(observation.domain).or_default();
        entry.tracker_ids.extend(observation.tracker_id);
        entry.campaign_ids.extend(observation.campaign_id);
        entry.paths.insert(observation.path);
    }

    pub fn observe_all(&mut self, observations: impl IntoIterator<Item = PathObservation>) {
        for observation in observations {
            self.observe(observation);
        }
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    /// Observations dropped for lacking a domain
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Close the batch and build one record per domain, sorted by domain
    pub fn finish(self, keywords: &KeywordSet) -> Vec<InventoryRecord> {
        let mut records = Vec::with_capacity(self.domains.len());

        for (domain, observed) in self.domains {
            if observed.paths.is_empty() {
                continue;
            }

            // Pass 1: every distinct path contributes to the table
            let frequency = SegmentFrequencyTable::from_paths(&observed.paths);

            // Pass 2: build against the frozen table
            let mut builder = PathPatternBuilder::new(&frequency, keywords);
            let patterns: BTreeSet<PathPattern> =
                observed.paths.iter().map(|path| builder.build(path)).collect();

            debug!(
                "Domain {}: {} paths -> {} patterns ({} distinct segments)",
                domain,
                observed.paths.len(),
                patterns.len(),
                frequency.len()
            );

            records.push(InventoryRecord {
                domain,
                tracker_ids: sort_tracker_ids(observed.tracker_ids),
                campaign_ids: observed.campaign_ids.into_iter().collect(),
                patterns: patterns.into_iter().collect(),
            });
        }

        info!("Built inventory for {} domains", records.len());
        records
    }
}

/// Numeric order when every id is a number, string order otherwise
fn sort_tracker_ids(ids: BTreeSet<String>) -> Vec<String> {
    let numeric: Option<Vec<(u64, String)>> = ids
        .iter()
        .map(|id| id.parse::<u64>().ok().map(|n| (n, id.clone())))
        .collect();

    match numeric {
        Some(mut pairs) => {
            pairs.sort();
            pairs.into_iter().map(|(_, id)| id).collect()
        }
        None => ids.into_iter().collect(),
    }
}

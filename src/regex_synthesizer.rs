//! Per-tracker regex synthesis.
//!
//! For tracker `T1` with `example.com -> ["/a(?:/.*)?", "/b(?:/.*)?"]`:
//!
//! ```text
//! ^https?://(?:[\w.-]+\.)?example\.com(?:/a(?:/.*)?|/b(?:/.*)?)(?:\?.*)?$
//! ```
//!
//! Several domains are joined as `(?:block1|block2)` between the scheme and
//! the query suffix.

use crate::dialect_escaper::DialectEscaper;
use crate::error::InvariantViolationError;
use crate::implementations::NativeRegexValidator;
use crate::path_pattern::PathPattern;
use crate::tracker_aggregator::{TrackerAggregator, TrackerPatternGroup};
use crate::traits::PatternValidator;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, warn};

const SCHEME_PREFIX: &str = "^https?://";
const SUBDOMAIN_WILDCARD: &str = r"(?:[\w.-]+\.)?";
const QUERY_SUFFIX: &str = r"(?:\?.*)?$";
/// Emitted for a tracker with no domain blocks; matches only the empty string
pub const EMPTY_PATTERN: &str = "^$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedRegex {
    pub tracker_id: String,
    /// Native-dialect pattern
    pub pattern: String,
    /// Whether the native engine compiled `pattern`
    pub valid: bool,
    /// Delimiter-wrapped form for the regex entry surface
    pub escaped: String,
}

/// Native compilation failed; the row is still emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub tracker_id: String,
    pub pattern: String,
    pub message: String,
}

/// Output of one synthesis batch
#[derive(Debug, Clone, Default)]
pub struct SynthesisReport {
    /// Sorted by tracker id
    pub rows: Vec<SynthesizedRegex>,
    pub warnings: Vec<ValidationWarning>,
    /// Trackers excluded from `rows`
    pub failures: Vec<InvariantViolationError>,
}

impl SynthesisReport {
    pub fn tracker_count(&self) -> usize {
        self.rows.len() + self.failures.len()
    }
}

/// One alternation branch: optional subdomain, escaped core, its patterns
pub fn domain_block(core: &str, patterns: &[PathPattern]) -> String {
    let unique: Vec<&str> = patterns
        .iter()
        .map(PathPattern::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let alternation = match unique.as_slice() {
        [single] if !has_top_level_alternation(single) => single.to_string(),
        _ => format!("(?:{})", unique.join("|")),
    };

    format!("{}{}{}", SUBDOMAIN_WILDCARD, regex::escape(core), alternation)
}

/// True if `pattern` has a `|` outside every group and character class,
/// e.g. `/a|/b` but not `/(?:a|b)` or `/[|]`
pub fn has_top_level_alternation(pattern: &str) -> bool {
    let mut depth = 0usize;
    let mut in_class = false;
    let mut chars = pattern.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            ']' if in_class => in_class = false,
            _ if in_class => {}
            '[' => in_class = true,
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => return true,
            _ => {}
        }
    }

    false
}

/// Assemble the anchored pattern for one tracker.
///
/// Domain cores are visited in sorted order; cores without patterns
/// contribute no block.
pub fn assemble_pattern(domains: &BTreeMap<String, Vec<PathPattern>>) -> String {
    let blocks: Vec<String> = domains
        .iter()
        .filter(|(_, patterns)| !patterns.is_empty())
        .map(|(core, patterns)| domain_block(core, patterns))
        .collect();

    let joined = match blocks.len() {
        0 => return EMPTY_PATTERN.to_string(),
        1 => blocks[0].clone(),
        _ => format!("(?:{})", blocks.join("|")),
    };

    format!("{}{}{}", SCHEME_PREFIX, joined, QUERY_SUFFIX)
}

pub struct RegexSynthesizer {
    validator: Box<dyn PatternValidator>,
    escaper: DialectEscaper,
}

impl Default for RegexSynthesizer {
    fn default() -> Self {
        Self::new(Box::new(NativeRegexValidator::default()), DialectEscaper::default())
    }
}

impl RegexSynthesizer {
    pub fn new(validator: Box<dyn PatternValidator>, escaper: DialectEscaper) -> Self {
        Self { validator, escaper }
    }

    /// Assemble, validate and escape one tracker's regex
    pub fn synthesize(
        &self,
        tracker_id: &str,
        domains: &BTreeMap<String, Vec<PathPattern>>,
    ) -> Result<(SynthesizedRegex, Option<ValidationWarning>), InvariantViolationError> {
        let pattern = assemble_pattern(domains);

        let warning = match self.validator.validate(&pattern) {
            Ok(()) => None,
            Err(message) => {
                warn!(
                    "Pattern for tracker {} failed {} validation: {}",
                    tracker_id,
                    self.validator.name(),
                    message
                );
                Some(ValidationWarning {
                    tracker_id: tracker_id.to_string(),
                    pattern: pattern.clone(),
                    message,
                })
            }
        };

        let escaped = self.escaper.escape(&pattern).map_err(|source| {
            error!("Dropping tracker {}: {}", tracker_id, source);
            InvariantViolationError {
                tracker_id: tracker_id.to_string(),
                source,
            }
        })?;

        debug!("Tracker {}: {} domains, {} bytes", tracker_id, domains.len(), pattern.len());

        Ok((
            SynthesizedRegex {
                tracker_id: tracker_id.to_string(),
                valid: warning.is_none(),
                pattern,
                escaped,
            },
            warning,
        ))
    }

    /// Finalize a group's domains and synthesize its regex
    pub fn synthesize_group(
        &self,
        group: TrackerPatternGroup,
    ) -> Result<(SynthesizedRegex, Option<ValidationWarning>), InvariantViolationError> {
        let domains = group.domains.into_finalized();
        self.synthesize(&group.tracker_id, &domains)
    }

    /// Synthesize every tracker of a finished aggregation
    pub fn synthesize_all(&self, trackers: TrackerAggregator, parallel: bool) -> SynthesisReport {
        let groups = trackers.into_groups();

        // Groups arrive sorted by tracker id and collect() keeps that order
        let results: Vec<_> = if parallel {
            groups
                .into_par_iter()
                .map(|group| self.synthesize_group(group))
                .collect()
        } else {
            groups
                .into_iter()
                .map(|group| self.synthesize_group(group))
                .collect()
        };

        let mut report = SynthesisReport::default();
        for result in results {
            match result {
                Ok((row, warning)) => {
                    report.rows.push(row);
                    report.warnings.extend(warning);
                }
                Err(failure) => report.failures.push(failure),
            }
        }

        report
    }
}

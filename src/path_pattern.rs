//! Path pattern generation:
//! 1. Split an observed path into segments
//! 2. Classify each segment against the domain's frequency table
//! 3. Build a regex fragment per segment and append the sub-path suffix
//!
//! `/billing/12345` becomes `/billing/[0-9]+(?:/.*)?`.

use crate::segment_classifier::{
    classify, split_segments, KeywordSet, SegmentClass, SegmentFrequencyTable, SEPARATOR,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Matches "this path, optionally followed by anything beneath it"
pub const SUBPATH_SUFFIX: &str = "(?:/.*)?";

/// A generalized matcher for a class of URL paths.
///
/// Ordered and compared by its textual form, which is also its serialized form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathPattern(String);

impl PathPattern {
    /// Build from classified fragments
    pub fn from_fragments(fragments: &[PathFragment]) -> Self {
        let core = fragments
            .iter()
            .map(PathFragment::to_regex)
            .collect::<Vec<_>>()
            .join("/");

        PathPattern(format!("{}{}{}", SEPARATOR, core, SUBPATH_SUFFIX))
    }

    /// Wrap an already-built pattern, e.g. one read from a JSON column.
    ///
    /// Returns `None` for blank input; a pattern is never empty.
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(PathPattern(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathPattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One generalized path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFragment {
    Literal(String),
    Placeholder(SegmentClass),
}

impl PathFragment {
    pub fn new(segment: &str, class: SegmentClass) -> Self {
        match class {
            SegmentClass::Literal => PathFragment::Literal(segment.to_string()),
            other => PathFragment::Placeholder(other),
        }
    }

    pub fn to_regex(&self) -> String {
        match self {
            PathFragment::Literal(text) => regex::escape(text),
            PathFragment::Placeholder(SegmentClass::Numeric) => "[0-9]+".to_string(),
            PathFragment::Placeholder(SegmentClass::Alpha) => "[A-Za-z]+".to_string(),
            PathFragment::Placeholder(SegmentClass::Alphanumeric) => "[A-Za-z0-9]+".to_string(),
            // Literal never reaches a placeholder; treat it like any other segment
            PathFragment::Placeholder(SegmentClass::Opaque | SegmentClass::Literal) => {
                "[^/]+".to_string()
            }
        }
    }
}

/// Classify every segment of `path`
pub fn classify_path(
    path: &str,
    frequency: &SegmentFrequencyTable,
    keywords: &KeywordSet,
) -> Vec<PathFragment> {
    split_segments(path)
        .into_iter()
        .map(|segment| PathFragment::new(segment, classify(segment, frequency, keywords)))
        .collect()
}

/// Build the pattern for one observed path
pub fn build_path_pattern(
    path: &str,
    frequency: &SegmentFrequencyTable,
    keywords: &KeywordSet,
) -> PathPattern {
    PathPattern::from_fragments(&classify_path(path, frequency, keywords))
}

/// Builds patterns for one domain, caching per distinct input path.
///
/// Holds a shared borrow of the domain's frequency table, so the table
/// cannot change while patterns are being built from it.
pub struct PathPatternBuilder<'a> {
    frequency: &'a SegmentFrequencyTable,
    keywords: &'a KeywordSet,
    cache: FxHashMap<String, PathPattern>,
}

impl<'a> PathPatternBuilder<'a> {
    pub fn new(frequency: &'a SegmentFrequencyTable, keywords: &'a KeywordSet) -> Self {
        Self {
            frequency,
            keywords,
            cache: FxHashMap::default(),
        }
    }

    pub fn build(&mut self, path: &str) -> PathPattern {
        if let Some(pattern) = self.cache.get(path) {
            return pattern.clone();
        }

        let pattern = build_path_pattern(path, self.frequency, self.keywords);
        self.cache.insert(path.to_string(), pattern.clone());
        pattern
    }

    /// Number of distinct paths built so far
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

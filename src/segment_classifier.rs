/// Segment Classification for URL Path Generalization
///
/// Classifies one path segment into one of five classes:
/// 1. LITERAL: letters/hyphens seen in the domain (or containing a keyword), kept verbatim
/// 2. NUMERIC: digits only
/// 3. ALPHA: letters only
/// 4. ALPHANUMERIC: letters and digits
/// 5. OPAQUE: anything else (underscores, dots, percent-escapes, ...)
///
/// Rules are evaluated in that order; the first match wins.
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Path separator for URL paths
pub const SEPARATOR: char = '/';

/// Keywords that mark a segment as business-relevant
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "billing",
    "paypal",
    "account",
    "checkout",
    "login",
    "shipping",
    "confirmation",
    "subscribe",
    "purchase",
    "payment",
    "blocked",
    "order",
    "thank-you",
    "thanks",
    "cart",
    "subscription",
    "success",
    "check-out",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentClass {
    /// Kept as escaped literal text
    /// Examples: "billing", "thank-you", "order-status"
    Literal,

    /// Examples: "12345", "007"
    Numeric,

    /// Letters not seen in the domain's frequency table
    Alpha,

    /// Examples: "abc123", "A1B2"
    Alphanumeric,

    /// Examples: "a_b!", "file.html", "%20x"
    Opaque,
}

/// Case-insensitive substring keyword set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        keywords.sort();
        keywords.dedup();

        Self { keywords }
    }

    /// Parse a comma-separated keyword list, e.g. "billing,cart"
    pub fn parse_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// True if the lowercase form of `segment` contains any keyword
    pub fn matches(&self, segment: &str) -> bool {
        let lower = segment.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}

/// Occurrence count of each literal segment across one domain's paths.
///
/// Must be fully populated before any pattern for the domain is built;
/// pattern building only ever borrows it immutably.
#[derive(Debug, Clone, Default)]
pub struct SegmentFrequencyTable {
    counts: FxHashMap<String, usize>,
}

impl SegmentFrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from every segment of every path
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for path in paths {
            table.record_path(path.as_ref());
        }
        table
    }

    pub fn record_path(&mut self, path: &str) {
        for segment in split_segments(path) {
            *self.counts.entry(segment.to_string()).or_insert(0) += 1;
        }
    }

    pub fn count(&self, segment: &str) -> usize {
        self.counts.get(segment).copied().unwrap_or(0)
    }

    /// Number of distinct segments
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Trim leading/trailing separators and split into ordered segments.
///
/// A root or empty path yields no segments. A doubled separator inside the
/// path yields an empty segment.
pub fn split_segments(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches(SEPARATOR);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split(SEPARATOR).collect()
}

/// Classify a path segment
pub fn classify(
    segment: &str,
    frequency: &SegmentFrequencyTable,
    keywords: &KeywordSet,
) -> SegmentClass {
    // The frequency clause already holds for any segment observed in the
    // domain, so the keyword clause only matters for tables built elsewhere.
    if is_alpha_hyphen(segment) && (frequency.count(segment) >= 1 || keywords.matches(segment)) {
        return SegmentClass::Literal;
    }

    if all_chars(segment, |c| c.is_ascii_digit()) {
        SegmentClass::Numeric
    } else if all_chars(segment, |c| c.is_ascii_alphabetic()) {
        SegmentClass::Alpha
    } else if all_chars(segment, |c| c.is_ascii_alphanumeric()) {
        SegmentClass::Alphanumeric
    } else {
        SegmentClass::Opaque
    }
}

/// Letters or hyphens only, e.g. "account-blocked"
fn is_alpha_hyphen(segment: &str) -> bool {
    all_chars(segment, |c| c.is_ascii_alphabetic() || c == '-')
}

/// Non-empty and every char satisfies `pred`
fn all_chars(segment: &str, pred: impl Fn(char) -> bool) -> bool {
    !segment.is_empty() && segment.chars().all(pred)
}

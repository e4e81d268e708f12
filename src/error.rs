//! Error types for the tracker regex pipeline.
//!
//! Library code returns these `thiserror` types; the binaries and the
//! row-source traits propagate them through `anyhow`.

use thiserror::Error;

/// A field that should decode as a structured list could not be parsed.
///
/// Never fatal: the caller logs it and treats the field as an empty list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedInputError {
    #[error("field `{field}` is not a JSON array of strings ({reason}): {value}")]
    PatternList {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("page url `{value}` could not be parsed: {reason}")]
    PageUrl { value: String, reason: String },
}

/// Delimiter escaping could not produce an unambiguous result.
///
/// Fails the affected tracker's row only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscapeError {
    #[error("pattern is already wrapped in '{delimiter}' delimiters: {pattern}")]
    AlreadyDelimited { pattern: String, delimiter: char },

    #[error("unescaped '{delimiter}' remains at byte {position} after escaping: {pattern}")]
    UnescapedSeparator {
        pattern: String,
        delimiter: char,
        position: usize,
    },
}

/// An escaping failure attributed to the tracker whose row it removed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("tracker {tracker_id}: {source}")]
pub struct InvariantViolationError {
    pub tracker_id: String,
    #[source]
    pub source: EscapeError,
}

/// Environment configuration held a value that cannot be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got `{value}`")]
    InvalidSize { var: &'static str, value: String },

    #[error("{var} must be `true` or `false`, got `{value}`")]
    InvalidFlag { var: &'static str, value: String },

    #[error("{var} did not contain any keywords")]
    EmptyKeywords { var: &'static str },
}

/// Failures at the CSV file boundary.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize patterns column: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid output path: {0}")]
    InvalidPath(String),
}

//! Structured records for the two input shapes and two output artifacts.
//!
//! CSV rows deserialize into the `*Row` types with defaults for optional
//! columns; they are converted into validated records before reaching the
//! aggregators.

use crate::error::MalformedInputError;
use crate::path_pattern::PathPattern;
use crate::regex_synthesizer::SynthesizedRegex;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

const LIST_DELIMITER: char = ',';

/// Split a delimited id list, trimming and dropping empty entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode a JSON array of pattern strings.
///
/// A blank field is an empty list. Blank entries are dropped.
pub fn parse_pattern_list(value: &str) -> Result<Vec<PathPattern>, MalformedInputError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<String> =
        serde_json::from_str(value).map_err(|e| MalformedInputError::PatternList {
            field: "patterns",
            value: value.to_string(),
            reason: e.to_string(),
        })?;

    Ok(texts.iter().filter_map(|t| PathPattern::from_text(t)).collect())
}

/// One observed page visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathObservation {
    pub domain: String,
    pub tracker_id: Option<String>,
    pub campaign_id: Option<String>,
    pub path: String,
}

impl PathObservation {
    pub fn new(domain: &str, tracker_id: &str, campaign_id: &str, path: &str) -> Self {
        Self {
            domain: domain.trim().to_lowercase(),
            tracker_id: non_empty(tracker_id),
            campaign_id: non_empty(campaign_id),
            path: normalize_path(path),
        }
    }

    /// Derive domain and path from a full page URL.
    ///
    /// The host is lowercased and the port dropped.
    pub fn from_page_url(
        page_url: &str,
        tracker_id: &str,
        campaign_id: &str,
    ) -> Result<Self, MalformedInputError> {
        let malformed = |reason: String| MalformedInputError::PageUrl {
            value: page_url.to_string(),
            reason,
        };

        let url = Url::parse(page_url.trim()).map_err(|e| malformed(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| malformed("url has no host".to_string()))?;

        Ok(Self::new(host, tracker_id, campaign_id, url.path()))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// Raw-observation CSV row: `domain,tracker_id,campaign_id,path`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawObservationRow {
    #[serde(default)]
    pub domain: String,
    #[serde(default, alias = "action_tracker_id")]
    pub tracker_id: String,
    #[serde(default)]
    pub campaign_id: String,
    #[serde(default)]
    pub path: String,
    /// Alternative to `domain`/`path`, as exported by the acquisition step
    #[serde(default, alias = "pageUrl", skip_serializing)]
    pub page_url: String,
}

impl RawObservationRow {
    /// Validate into an observation; `None` when no domain can be found
    pub fn into_observation(self) -> Option<PathObservation> {
        if !self.domain.trim().is_empty() {
            return Some(PathObservation::new(
                &self.domain,
                &self.tracker_id,
                &self.campaign_id,
                &self.path,
            ));
        }

        if self.page_url.trim().is_empty() {
            return None;
        }

        match PathObservation::from_page_url(&self.page_url, &self.tracker_id, &self.campaign_id) {
            Ok(observation) => Some(observation),
            Err(e) => {
                warn!("Skipping observation: {}", e);
                None
            }
        }
    }
}

/// Per-domain inventory, the pre-aggregated input of synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    pub domain: String,
    pub tracker_ids: Vec<String>,
    pub campaign_ids: Vec<String>,
    pub patterns: Vec<PathPattern>,
}

impl InventoryRecord {
    pub fn to_row(&self) -> Result<InventoryRow, serde_json::Error> {
        Ok(InventoryRow {
            domain: self.domain.clone(),
            tracker_ids: self.tracker_ids.join(","),
            campaign_ids: self.campaign_ids.join(","),
            patterns: serde_json::to_string(&self.patterns)?,
        })
    }
}

/// Inventory CSV row: `domain,tracker_ids,campaign_ids,patterns`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct InventoryRow {
    #[serde(default)]
    pub domain: String,
    #[serde(default, alias = "action_tracker_ids")]
    pub tracker_ids: String,
    #[serde(default)]
    pub campaign_ids: String,
    #[serde(default)]
    pub patterns: String,
}

impl InventoryRow {
    /// Validate the row. A malformed patterns field becomes an empty list.
    pub fn into_record(self) -> InventoryRecord {
        let patterns = match parse_pattern_list(&self.patterns) {
            Ok(patterns) => patterns,
            Err(e) => {
                warn!("Domain {}: {}; using no patterns", self.domain, e);
                Vec::new()
            }
        };

        InventoryRecord {
            domain: self.domain.trim().to_string(),
            tracker_ids: split_list(&self.tracker_ids),
            campaign_ids: split_list(&self.campaign_ids),
            patterns,
        }
    }
}

/// Combined regex CSV row: `tracker_id,native_regex,delimited_regex`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TrackerRegexRow {
    pub tracker_id: String,
    pub native_regex: String,
    pub delimited_regex: String,
}

impl From<&SynthesizedRegex> for TrackerRegexRow {
    fn from(regex: &SynthesizedRegex) -> Self {
        Self {
            tracker_id: regex.tracker_id.clone(),
            native_regex: regex.pattern.clone(),
            delimited_regex: regex.escaped.clone(),
        }
    }
}

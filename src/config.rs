use crate::error::ConfigError;
use crate::implementations::DEFAULT_REGEX_SIZE_LIMIT;
use crate::segment_classifier::KeywordSet;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // Input of the inventory stage (raw observations)
    pub observations_csv: PathBuf,

    // Output of the inventory stage, input of the synthesis stage
    pub inventory_csv: PathBuf,

    // Output of the synthesis stage
    pub tracker_regex_csv: PathBuf,

    pub keywords: KeywordSet,

    // Compiled-size limit for native validation, in bytes
    pub regex_size_limit: usize,

    // Synthesize trackers on the rayon pool
    pub parallel_synthesis: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            observations_csv: PathBuf::from("observations.csv"),
            inventory_csv: PathBuf::from("final_url_variations.csv"),
            tracker_regex_csv: PathBuf::from("tracker_regex.csv"),
            keywords: KeywordSet::default(),
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
            parallel_synthesis: true,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by any `TRACKER_*` variables that are set
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let keywords = match env::var("TRACKER_KEYWORDS") {
            Ok(list) => {
                let keywords = KeywordSet::parse_list(&list);
                if keywords.is_empty() {
                    return Err(ConfigError::EmptyKeywords {
                        var: "TRACKER_KEYWORDS",
                    });
                }
                keywords
            }
            Err(_) => defaults.keywords,
        };

        let regex_size_limit = match env::var("TRACKER_REGEX_SIZE_LIMIT") {
            Ok(value) => parse_size("TRACKER_REGEX_SIZE_LIMIT", &value)?,
            Err(_) => defaults.regex_size_limit,
        };

        let parallel_synthesis = match env::var("TRACKER_PARALLEL_SYNTHESIS") {
            Ok(value) => parse_flag("TRACKER_PARALLEL_SYNTHESIS", &value)?,
            Err(_) => defaults.parallel_synthesis,
        };

        Ok(PipelineConfig {
            observations_csv: env::var("TRACKER_OBSERVATIONS_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.observations_csv),

            inventory_csv: env::var("TRACKER_INVENTORY_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.inventory_csv),

            tracker_regex_csv: env::var("TRACKER_REGEX_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.tracker_regex_csv),

            keywords,
            regex_size_limit,
            parallel_synthesis,
        })
    }

    pub fn with_observations_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.observations_csv = path.into();
        self
    }

    pub fn with_inventory_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.inventory_csv = path.into();
        self
    }

    pub fn with_tracker_regex_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.tracker_regex_csv = path.into();
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_regex_size_limit(mut self, bytes: usize) -> Self {
        self.regex_size_limit = bytes.max(1);
        self
    }

    pub fn with_parallel_synthesis(mut self, enabled: bool) -> Self {
        self.parallel_synthesis = enabled;
        self
    }

    pub fn log_config(&self) {
        tracing::info!("📋 Configuration:");
        tracing::info!("   Observations CSV: {}", self.observations_csv.display());
        tracing::info!("   Inventory CSV: {}", self.inventory_csv.display());
        tracing::info!("   Tracker regex CSV: {}", self.tracker_regex_csv.display());
        tracing::info!(
            "   Keywords ({}): {}",
            self.keywords.len(),
            self.keywords.iter().collect::<Vec<_>>().join(",")
        );
        tracing::info!("   Regex size limit: {} bytes", self.regex_size_limit);
        tracing::info!("   Parallel synthesis: {}", self.parallel_synthesis);
    }
}

fn parse_size(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidSize {
            var,
            value: value.to_string(),
        }),
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.keywords.len(), 18);
        assert_eq!(config.regex_size_limit, DEFAULT_REGEX_SIZE_LIMIT);
        assert!(config.parallel_synthesis);
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::new()
            .with_inventory_csv("in.csv")
            .with_keywords(KeywordSet::parse_list("promo"))
            .with_regex_size_limit(0)
            .with_parallel_synthesis(false);

        assert_eq!(config.inventory_csv, PathBuf::from("in.csv"));
        assert_eq!(config.keywords.len(), 1);
        assert_eq!(config.regex_size_limit, 1);
        assert!(!config.parallel_synthesis);
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("X", " 2048 "), Ok(2048));
        assert!(parse_size("X", "0").is_err());
        assert!(parse_size("X", "ten").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("X", "TRUE"), Ok(true));
        assert_eq!(parse_flag("X", "0"), Ok(false));
        assert!(matches!(
            parse_flag("X", "maybe"),
            Err(ConfigError::InvalidFlag { var: "X", .. })
        ));
    }
}

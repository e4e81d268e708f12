use crate::csv_io;
use crate::records::{InventoryRecord, PathObservation};
use crate::traits::{InventorySource, ObservationSource, PatternValidator};
use anyhow::{Context, Result};
use regex::RegexBuilder;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Default compiled-size limit for validation (10 MiB, the `regex` crate default)
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Raw observations from a CSV file
pub struct CsvObservationFile {
    path: PathBuf,
    name: String,
}

impl CsvObservationFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl ObservationSource for CsvObservationFile {
    fn load_observations(&self) -> Result<Vec<PathObservation>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open observations file: {}", self.path.display()))?;

        csv_io::read_observations(BufReader::new(file))
            .with_context(|| format!("Failed to read observations file: {}", self.path.display()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Pre-aggregated inventory from a CSV file
pub struct CsvInventoryFile {
    path: PathBuf,
    name: String,
}

impl CsvInventoryFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl InventorySource for CsvInventoryFile {
    fn load_inventory(&self) -> Result<Vec<InventoryRecord>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open inventory file: {}", self.path.display()))?;

        csv_io::read_inventory(BufReader::new(file))
            .with_context(|| format!("Failed to read inventory file: {}", self.path.display()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// In-memory observations for tests and embedding
pub struct InMemoryObservations {
    name: String,
    observations: Vec<PathObservation>,
}

impl InMemoryObservations {
    pub fn new(name: &str, observations: Vec<PathObservation>) -> Self {
        Self {
            name: name.to_string(),
            observations,
        }
    }
}

impl ObservationSource for InMemoryObservations {
    fn load_observations(&self) -> Result<Vec<PathObservation>> {
        Ok(self.observations.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// In-memory inventory for tests and embedding
pub struct InMemoryInventory {
    name: String,
    records: Vec<InventoryRecord>,
}

impl InMemoryInventory {
    pub fn new(name: &str, records: Vec<InventoryRecord>) -> Self {
        Self {
            name: name.to_string(),
            records,
        }
    }
}

impl InventorySource for InMemoryInventory {
    fn load_inventory(&self) -> Result<Vec<InventoryRecord>> {
        Ok(self.records.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Validates by compiling with the `regex` crate
pub struct NativeRegexValidator {
    size_limit: usize,
}

impl NativeRegexValidator {
    pub fn new(size_limit: usize) -> Self {
        Self { size_limit }
    }
}

impl Default for NativeRegexValidator {
    fn default() -> Self {
        Self::new(DEFAULT_REGEX_SIZE_LIMIT)
    }
}

impl PatternValidator for NativeRegexValidator {
    fn validate(&self, pattern: &str) -> std::result::Result<(), String> {
        RegexBuilder::new(pattern)
            .size_limit(self.size_limit)
            .build()
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    fn name(&self) -> &str {
        "regex"
    }
}

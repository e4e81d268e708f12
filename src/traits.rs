/// Trait seams for the pipeline
///
/// This module provides abstractions for:
/// - Loading raw observations
/// - Loading pre-aggregated inventory rows
/// - Validating synthesized patterns against a regex engine
///
/// Pipelines can then run against CSV files, in-memory fixtures, or a
/// different validation engine without changing the core.
use crate::records::{InventoryRecord, PathObservation};
use anyhow::Result;

// ============================================================================
// Row Sources
// ============================================================================

/// Source of raw-observation rows (one per observed page visit)
pub trait ObservationSource: Send + Sync {
    /// Load every observation of the batch
    fn load_observations(&self) -> Result<Vec<PathObservation>>;

    /// Get the source name (for logging)
    fn name(&self) -> &str;
}

/// Source of pre-aggregated per-domain rows
pub trait InventorySource: Send + Sync {
    /// Load every inventory record of the batch
    ///
    /// Malformed list fields are already replaced by empty lists.
    fn load_inventory(&self) -> Result<Vec<InventoryRecord>>;

    /// Get the source name (for logging)
    fn name(&self) -> &str;
}

// ============================================================================
// Pattern Validation
// ============================================================================

/// Compiles a synthesized pattern to check that it is usable
///
/// Failures are reported as warnings; they never block emission.
pub trait PatternValidator: Send + Sync {
    /// `Err` carries the engine's message
    fn validate(&self, pattern: &str) -> std::result::Result<(), String>;

    /// Get the engine name (for reporting)
    fn name(&self) -> &str;
}

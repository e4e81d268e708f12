//! One batch run of the tracker regex pipeline.
//!
//! ```text
//! observations -> DomainInventory -> inventory records
//! inventory records -> TrackerAggregator -> RegexSynthesizer -> report
//! ```
//!
//! Every stage creates its aggregation state on entry and drops it once the
//! stage has finalized, so runs share nothing.

use crate::config::PipelineConfig;
use crate::csv_io::{self, StagedFile};
use crate::dialect_escaper::DialectEscaper;
use crate::implementations::{CsvInventoryFile, CsvObservationFile, NativeRegexValidator};
use crate::inventory::DomainInventory;
use crate::records::InventoryRecord;
use crate::regex_synthesizer::{RegexSynthesizer, SynthesisReport};
use crate::tracker_aggregator::TrackerAggregator;
use crate::traits::{InventorySource, ObservationSource};
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::info;

pub struct Pipeline {
    config: PipelineConfig,
    synthesizer: RegexSynthesizer,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let validator = NativeRegexValidator::new(config.regex_size_limit);
        let synthesizer = RegexSynthesizer::new(Box::new(validator), DialectEscaper::default());
        Self::with_synthesizer(config, synthesizer)
    }

    pub fn with_synthesizer(config: PipelineConfig, synthesizer: RegexSynthesizer) -> Self {
        Self {
            config,
            synthesizer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Raw observations -> per-domain inventory
    pub fn build_inventory(&self, source: &dyn ObservationSource) -> Result<Vec<InventoryRecord>> {
        let observations = source.load_observations()?;
        info!("Loaded {} observations from {}", observations.len(), source.name());

        let mut inventory = DomainInventory::new();
        inventory.observe_all(observations);
        Ok(inventory.finish(&self.config.keywords))
    }

    /// Inventory records -> one synthesized regex per tracker id
    pub fn combine(&self, records: &[InventoryRecord]) -> SynthesisReport {
        let mut trackers = TrackerAggregator::new();
        for record in records {
            trackers.add_row(&record.tracker_ids, &record.domain, &record.patterns);
        }
        info!(
            "Grouped {} inventory rows into {} trackers",
            records.len(),
            trackers.len()
        );

        let report = self
            .synthesizer
            .synthesize_all(trackers, self.config.parallel_synthesis);

        info!(
            "Synthesized {} regexes ({} validation warnings, {} dropped)",
            report.rows.len(),
            report.warnings.len(),
            report.failures.len()
        );
        report
    }

    /// Load inventory from a source and combine it
    pub fn combine_from(&self, source: &dyn InventorySource) -> Result<SynthesisReport> {
        let records = source.load_inventory()?;
        info!("Loaded {} inventory rows from {}", records.len(), source.name());
        Ok(self.combine(&records))
    }

    /// Synthesis stage from the configured inventory file to the regex file
    pub fn run_combine(&self) -> Result<SynthesisReport> {
        let source = CsvInventoryFile::new(&self.config.inventory_csv);
        let report = self.combine_from(&source)?;
        self.commit_regexes(&report)?;
        Ok(report)
    }

    /// Both stages, from the configured observations file.
    ///
    /// Both artifacts are staged before either replaces its target.
    pub fn run(&self) -> Result<SynthesisReport> {
        let start = Instant::now();

        let source = CsvObservationFile::new(&self.config.observations_csv);
        let records = self.build_inventory(&source)?;
        let report = self.combine(&records);

        let inventory = self.stage_inventory(&records)?;
        let regexes = self.stage_regexes(&report)?;
        inventory.commit().context("Failed to commit inventory")?;
        regexes.commit().context("Failed to commit tracker regexes")?;

        info!("Wrote {} domain entries to {}", records.len(), self.config.inventory_csv.display());
        info!("Wrote {} rows to {}", report.rows.len(), self.config.tracker_regex_csv.display());
        info!("Pipeline finished in {:.2}s", start.elapsed().as_secs_f64());
        Ok(report)
    }

    fn stage_inventory(&self, records: &[InventoryRecord]) -> Result<StagedFile> {
        let path = &self.config.inventory_csv;
        csv_io::stage_file(path, |out| csv_io::write_inventory(out, records))
            .with_context(|| format!("Failed to write inventory: {}", path.display()))
    }

    fn stage_regexes(&self, report: &SynthesisReport) -> Result<StagedFile> {
        let path = &self.config.tracker_regex_csv;
        csv_io::stage_file(path, |out| csv_io::write_tracker_regexes(out, &report.rows))
            .with_context(|| format!("Failed to write tracker regexes: {}", path.display()))
    }

    fn commit_regexes(&self, report: &SynthesisReport) -> Result<()> {
        self.stage_regexes(report)?
            .commit()
            .context("Failed to commit tracker regexes")?;
        info!("Wrote {} rows to {}", report.rows.len(), self.config.tracker_regex_csv.display());
        Ok(())
    }
}

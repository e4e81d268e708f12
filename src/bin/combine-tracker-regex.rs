/// Synthesize one regex per tracker from a pre-aggregated inventory CSV
///
/// Reads TRACKER_INVENTORY_CSV (domain,tracker_ids,campaign_ids,patterns)
/// and writes TRACKER_REGEX_CSV.
use anyhow::Result;
use tracker_regex::config::PipelineConfig;
use tracker_regex::pipeline::Pipeline;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = PipelineConfig::from_env()?;
    config.log_config();

    if !config.inventory_csv.exists() {
        anyhow::bail!(
            "Inventory file not found: {}",
            config.inventory_csv.display()
        );
    }

    let report = Pipeline::new(config).run_combine()?;

    for warning in &report.warnings {
        println!("WARNING: tracker {}: {}", warning.tracker_id, warning.message);
    }
    for failure in &report.failures {
        eprintln!("  Excluded {}", failure);
    }

    println!("Done! Wrote {} rows.", report.rows.len());
    Ok(())
}

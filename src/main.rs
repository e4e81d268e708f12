/// Infer path patterns from raw observations and synthesize one regex per tracker
///
/// Reads TRACKER_OBSERVATIONS_CSV, writes TRACKER_INVENTORY_CSV and
/// TRACKER_REGEX_CSV.
use anyhow::Result;
use tracker_regex::config::PipelineConfig;
use tracker_regex::pipeline::Pipeline;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match PipelineConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("❌ Configuration error: {}", e);
            tracing::error!("💡 Optional environment variables:");
            tracing::error!("   - TRACKER_OBSERVATIONS_CSV: raw observations (domain,tracker_id,campaign_id,path)");
            tracing::error!("   - TRACKER_INVENTORY_CSV: per-domain inventory output");
            tracing::error!("   - TRACKER_REGEX_CSV: per-tracker regex output");
            tracing::error!("   - TRACKER_KEYWORDS: comma-separated keyword list");
            tracing::error!("   - TRACKER_REGEX_SIZE_LIMIT: validation size limit in bytes");
            tracing::error!("   - TRACKER_PARALLEL_SYNTHESIS: true or false");
            std::process::exit(1);
        }
    };

    config.log_config();

    let report = Pipeline::new(config).run()?;

    for failure in &report.failures {
        tracing::error!("Excluded: {}", failure);
    }
    println!(
        "Done! Wrote {} tracker regexes ({} warnings, {} excluded).",
        report.rows.len(),
        report.warnings.len(),
        report.failures.len()
    );

    Ok(())
}

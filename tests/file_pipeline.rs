/// File-based runs: both stages from CSV, and all-or-nothing commits
use std::fs;
use tempfile::TempDir;
use tracker_regex::config::PipelineConfig;
use tracker_regex::pipeline::Pipeline;

fn config_in(dir: &TempDir) -> PipelineConfig {
    PipelineConfig::new()
        .with_observations_csv(dir.path().join("observations.csv"))
        .with_inventory_csv(dir.path().join("inventory.csv"))
        .with_tracker_regex_csv(dir.path().join("tracker_regex.csv"))
}

#[test]
fn test_full_run_writes_both_artifacts() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    fs::write(
        &config.observations_csv,
        "\
domain,tracker_id,campaign_id,path
www.example.com,153246,c1,/billing/12345
www.example.com,153246,c2,/billing/777/
www.example.com,33996,c1,/thank-you
shop.net,33996,,/p/ab12
",
    )
    .unwrap();

    let report = Pipeline::new(config.clone()).run().unwrap();
    assert_eq!(report.rows.len(), 2);

    let inventory = fs::read_to_string(&config.inventory_csv).unwrap();
    let mut lines = inventory.lines();
    assert_eq!(lines.next(), Some("domain,tracker_ids,campaign_ids,patterns"));
    assert_eq!(lines.next(), Some(r#"shop.net,33996,,"[""/p/[A-Za-z0-9]+(?:/.*)?""]""#));
    assert_eq!(
        lines.next(),
        Some(
            r#"www.example.com,"33996,153246","c1,c2","[""/billing/[0-9]+(?:/.*)?"",""/thank\\-you(?:/.*)?""]""#
        )
    );

    let regexes = fs::read_to_string(&config.tracker_regex_csv).unwrap();
    let lines: Vec<&str> = regexes.lines().collect();
    assert_eq!(lines[0], "tracker_id,native_regex,delimited_regex");
    assert!(lines[1].starts_with("153246,"));
    assert!(lines[2].starts_with("33996,"));
    assert!(lines[2].contains(r"shop\.net"));
    assert!(!dir.path().join("tracker_regex.csv.tmp").exists());
}

#[test]
fn test_combine_stage_from_inventory_file() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    fs::write(
        &config.inventory_csv,
        r#"domain,action_tracker_ids,campaign_ids,patterns
example.com,T1,,"[""/a(?:/.*)?"",""/b(?:/.*)?""]"
"#,
    )
    .unwrap();

    let report = Pipeline::new(config.clone()).run_combine().unwrap();
    assert_eq!(report.rows.len(), 1);

    let regexes = fs::read_to_string(&config.tracker_regex_csv).unwrap();
    assert!(regexes.contains(r"/^https?:\/\/(?:[\w.-]+\.)?example\.com(?:\/a(?:\/.*)?|\/b(?:\/.*)?)(?:\?.*)?$/"));
}

#[test]
fn test_failed_regex_write_keeps_previous_inventory() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).with_tracker_regex_csv(dir.path().join("missing/tracker_regex.csv"));

    fs::write(&config.observations_csv, "domain,tracker_id,path\na.com,1,/cart\n").unwrap();
    fs::write(&config.inventory_csv, "previous\n").unwrap();

    assert!(Pipeline::new(config.clone()).run().is_err());
    assert_eq!(fs::read_to_string(&config.inventory_csv).unwrap(), "previous\n");
    assert!(!dir.path().join("inventory.csv.tmp").exists());
}

#[test]
fn test_empty_observations_still_write_headers() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    fs::write(&config.observations_csv, "domain,tracker_id,campaign_id,path\n").unwrap();

    let report = Pipeline::new(config.clone()).run().unwrap();
    assert!(report.rows.is_empty());

    assert_eq!(
        fs::read_to_string(&config.inventory_csv).unwrap(),
        "domain,tracker_ids,campaign_ids,patterns\n"
    );
    assert_eq!(
        fs::read_to_string(&config.tracker_regex_csv).unwrap(),
        "tracker_id,native_regex,delimited_regex\n"
    );
}

#[test]
fn test_missing_input_leaves_previous_output_untouched() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    fs::write(&config.tracker_regex_csv, "previous\n").unwrap();

    assert!(Pipeline::new(config.clone()).run_combine().is_err());
    assert_eq!(fs::read_to_string(&config.tracker_regex_csv).unwrap(), "previous\n");
}

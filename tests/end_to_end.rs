/// End-to-end behaviour of inventory building and regex synthesis
use tracker_regex::config::PipelineConfig;
use tracker_regex::dialect_escaper::escape_for_delimited_dialect;
use tracker_regex::implementations::{InMemoryInventory, InMemoryObservations};
use tracker_regex::path_pattern::PathPattern;
use tracker_regex::pipeline::Pipeline;
use tracker_regex::records::{InventoryRecord, InventoryRow, PathObservation};

fn record(domain: &str, ids: &[&str], patterns: &[&str]) -> InventoryRecord {
    InventoryRecord {
        domain: domain.to_string(),
        tracker_ids: ids.iter().map(|s| s.to_string()).collect(),
        campaign_ids: vec![],
        patterns: patterns.iter().filter_map(|p| PathPattern::from_text(p)).collect(),
    }
}

fn pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig::default())
}

#[test]
fn test_billing_path_end_to_end() {
    let source = InMemoryObservations::new(
        "billing",
        vec![PathObservation::new("example.com", "T1", "", "/billing/12345")],
    );

    let records = pipeline().build_inventory(&source).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].patterns[0].as_str(), "/billing/[0-9]+(?:/.*)?");

    let report = pipeline().combine(&records);
    assert_eq!(
        report.rows[0].pattern,
        r"^https?://(?:[\w.-]+\.)?example\.com/billing/[0-9]+(?:/.*)?(?:\?.*)?$"
    );
}

#[test]
fn test_two_patterns_synthesized_and_escaped() {
    let records = vec![record("example.com", &["T1"], &["/a(?:/.*)?", "/b(?:/.*)?"])];
    let report = pipeline().combine(&records);
    let row = &report.rows[0];

    let expected = r"^https?://(?:[\w.-]+\.)?example\.com(?:/a(?:/.*)?|/b(?:/.*)?)(?:\?.*)?$";
    assert_eq!(row.pattern, expected);
    assert!(row.valid);
    assert_eq!(row.escaped, format!("/{}/", expected.replace('/', r"\/")));
    assert_eq!(row.escaped, escape_for_delimited_dialect(expected).unwrap());
}

#[test]
fn test_synthesized_regex_matches_urls() {
    let records = vec![record("www.example.com", &["T1"], &["/billing/[0-9]+(?:/.*)?"])];
    let report = pipeline().combine(&records);
    let re = regex::Regex::new(&report.rows[0].pattern).unwrap();

    assert!(re.is_match("https://example.com/billing/12345"));
    assert!(re.is_match("http://www.example.com/billing/1/receipt?x=1"));
    assert!(re.is_match("https://eu.shop.example.com/billing/7"));
    assert!(!re.is_match("https://example.com/billing/abc"));
    assert!(!re.is_match("ftp://example.com/billing/1"));
    assert!(!re.is_match("https://notexample.com/billing/1"));
}

#[test]
fn test_tracker_rows_from_two_domains_are_both_kept() {
    let records = vec![
        record("x.com", &["T2"], &["/a(?:/.*)?"]),
        record("y.com", &["T2"], &["/b(?:/.*)?"]),
    ];
    let report = pipeline().combine(&records);

    assert_eq!(report.rows.len(), 1);
    assert!(report.rows[0].pattern.contains(r"x\.com/a"));
    assert!(report.rows[0].pattern.contains(r"y\.com/b"));
}

#[test]
fn test_every_regex_anchored_with_one_scheme() {
    let records = vec![
        record("a.com", &["1", "2"], &["/x(?:/.*)?"]),
        record("b.com", &["2"], &["/y(?:/.*)?", "/z(?:/.*)?"]),
        record("c.com", &["3"], &[]),
    ];
    let report = pipeline().combine(&records);

    assert_eq!(report.rows.len(), 3);
    for row in &report.rows {
        assert!(row.pattern.starts_with('^'), "{}", row.pattern);
        assert!(row.pattern.ends_with('$'), "{}", row.pattern);
    }
    for row in report.rows.iter().filter(|r| r.pattern != "^$") {
        assert_eq!(row.pattern.matches("https?").count(), 1);
    }
    // Tracker 3 contributed no patterns but still has a row
    assert_eq!(report.rows[2].tracker_id, "3");
    assert_eq!(report.rows[2].pattern, "^$");
}

#[test]
fn test_tracker_ids_sorted_as_strings() {
    let records = vec![
        record("a.com", &["9"], &["/a(?:/.*)?"]),
        record("a.com", &["10"], &["/a(?:/.*)?"]),
        record("a.com", &["100"], &["/a(?:/.*)?"]),
    ];
    let report = pipeline().combine(&records);

    let ids: Vec<&str> = report.rows.iter().map(|r| r.tracker_id.as_str()).collect();
    assert_eq!(ids, vec!["10", "100", "9"]);
}

#[test]
fn test_output_independent_of_row_order() {
    let records = vec![
        record("www.b.com", &["1"], &["/q(?:/.*)?"]),
        record("a.com", &["1", "2"], &["/p(?:/.*)?"]),
        record("b.com", &["1"], &["/r(?:/.*)?"]),
    ];
    let reversed: Vec<_> = records.iter().rev().cloned().collect();

    let forward = pipeline().combine(&records);
    let backward = pipeline().combine(&reversed);
    assert_eq!(forward.rows, backward.rows);
}

#[test]
fn test_malformed_patterns_field_still_yields_tracker_row() {
    let row = InventoryRow {
        domain: "example.com".to_string(),
        tracker_ids: "42".to_string(),
        campaign_ids: "c1".to_string(),
        patterns: "[\"/a(?:/.*)?\"".to_string(),
    };
    let source = InMemoryInventory::new("malformed", vec![row.into_record()]);

    let report = pipeline().combine_from(&source).unwrap();
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].tracker_id, "42");
    assert_eq!(report.rows[0].pattern, "^$");
}

#[test]
fn test_external_pattern_alternation_stays_inside_domain() {
    let row = InventoryRow {
        domain: "x.com".to_string(),
        tracker_ids: "T1".to_string(),
        campaign_ids: String::new(),
        patterns: r#"["/a|/b"]"#.to_string(),
    };
    let report = pipeline().combine(&[row.into_record()]);
    let re = regex::Regex::new(&report.rows[0].pattern).unwrap();

    assert!(re.is_match("https://x.com/a"));
    assert!(re.is_match("https://x.com/b"));
    assert!(!re.is_match("https://evil.com/b"));
}

#[test]
fn test_escape_failure_only_drops_that_tracker() {
    let records = vec![
        record("a.com", &["ok"], &["/a(?:/.*)?"]),
        record("a.com", &["broken"], &[r"/a\\/b"]),
    ];
    let report = pipeline().combine(&records);

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].tracker_id, "ok");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].tracker_id, "broken");
}

#[test]
fn test_invalid_native_pattern_is_a_warning() {
    // Lookbehind compiles elsewhere but not in the native engine
    let records = vec![record("a.com", &["7"], &["/(?<=x)y(?:/.*)?"])];
    let report = pipeline().combine(&records);

    assert_eq!(report.rows.len(), 1);
    assert!(!report.rows[0].valid);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].tracker_id, "7");
}

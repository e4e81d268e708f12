/// CSV reading and writing for observations, inventory and tracker regexes
///
/// Readers accept any `io::Read`; file writers stage the whole artifact in a
/// sibling `.tmp` file and rename it into place, so a failed batch never
/// leaves a partial file behind.
use crate::error::IoError;
use crate::records::{
    InventoryRecord, InventoryRow, PathObservation, RawObservationRow, TrackerRegexRow,
};
use crate::regex_synthesizer::SynthesizedRegex;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read raw-observation rows, dropping rows without a usable domain
pub fn read_observations<R: io::Read>(reader: R) -> Result<Vec<PathObservation>, IoError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut observations = Vec::new();
    let mut dropped = 0usize;

    for result in reader.deserialize() {
        let row: RawObservationRow = result?;
        match row.into_observation() {
            Some(observation) => observations.push(observation),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!("Dropped {} observation rows without a domain", dropped);
    }

    Ok(observations)
}

/// Read pre-aggregated inventory rows
pub fn read_inventory<R: io::Read>(reader: R) -> Result<Vec<InventoryRecord>, IoError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in reader.deserialize() {
        let row: InventoryRow = result?;
        records.push(row.into_record());
    }

    Ok(records)
}

pub fn write_inventory<W: io::Write>(writer: W, records: &[InventoryRecord]) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_writer(writer);
    if records.is_empty() {
        writer.write_record(["domain", "tracker_ids", "campaign_ids", "patterns"])?;
    }
    for record in records {
        writer.serialize(record.to_row()?)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_tracker_regexes<W: io::Write>(
    writer: W,
    rows: &[SynthesizedRegex],
) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_writer(writer);
    // Header is written even when there are no rows
    if rows.is_empty() {
        writer.write_record(["tracker_id", "native_regex", "delimited_regex"])?;
    }
    for row in rows {
        writer.serialize(TrackerRegexRow::from(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// An artifact fully written to its staging file, not yet in place.
///
/// Dropping it without `commit` removes the staging file.
#[derive(Debug)]
pub struct StagedFile {
    staging: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Rename the staging file over the target
    pub fn commit(mut self) -> Result<(), IoError> {
        fs::rename(&self.staging, &self.target)?;
        self.committed = true;
        debug!("Committed {}", self.target.display());
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.staging);
        }
    }
}

/// Write the whole artifact for `path` into a sibling `.tmp` file
pub fn stage_file<F>(path: &Path, write: F) -> Result<StagedFile, IoError>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> Result<(), IoError>,
{
    let staged = StagedFile {
        staging: staging_path(path)?,
        target: path.to_path_buf(),
        committed: false,
    };

    let mut out = BufWriter::new(fs::File::create(&staged.staging)?);
    write(&mut out)?;
    out.flush()?;

    Ok(staged)
}

fn staging_path(path: &Path) -> Result<PathBuf, IoError> {
    let name = path
        .file_name()
        .ok_or_else(|| IoError::InvalidPath(path.display().to_string()))?;

    let mut staged = name.to_os_string();
    staged.push(".tmp");
    Ok(path.with_file_name(staged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_pattern::PathPattern;

    #[test]
    fn test_read_observations_with_optional_columns() {
        let data = "\
domain,path
example.com,/billing/1
,/ignored
";
        let observations = read_observations(data.as_bytes()).unwrap();

        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].tracker_id, None);
        assert_eq!(observations[0].path, "/billing/1");
    }

    #[test]
    fn test_read_observations_from_page_url() {
        let data = "\
campaign_id,action_tracker_id,pageUrl
c1,77,https://www.example.com/thanks?id=3
";
        let observations = read_observations(data.as_bytes()).unwrap();

        assert_eq!(observations[0].domain, "www.example.com");
        assert_eq!(observations[0].path, "/thanks");
        assert_eq!(observations[0].tracker_id.as_deref(), Some("77"));
    }

    #[test]
    fn test_read_inventory_accepts_legacy_header() {
        let data = r#"domain,action_tracker_ids,campaign_ids,patterns,total_rows
example.com,"153246,33996",,"[""/billing(?:/.*)?""]",12
bad.com,9,,[oops,1
"#;
        let records = read_inventory(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tracker_ids, vec!["153246", "33996"]);
        assert_eq!(records[0].patterns[0].as_str(), "/billing(?:/.*)?");
        assert!(records[1].patterns.is_empty());
    }

    #[test]
    fn test_write_inventory() {
        let records = vec![InventoryRecord {
            domain: "example.com".to_string(),
            tracker_ids: vec!["1".to_string(), "2".to_string()],
            campaign_ids: vec![],
            patterns: vec![PathPattern::from_text("/a(?:/.*)?").unwrap()],
        }];

        let mut out = Vec::new();
        write_inventory(&mut out, &records).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "domain,tracker_ids,campaign_ids,patterns\nexample.com,\"1,2\",,\"[\"\"/a(?:/.*)?\"\"]\"\n"
        );
    }

    #[test]
    fn test_write_empty_tracker_regexes_has_header() {
        let mut out = Vec::new();
        write_tracker_regexes(&mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "tracker_id,native_regex,delimited_regex\n"
        );
    }

    #[test]
    fn test_write_empty_inventory_has_header() {
        let mut out = Vec::new();
        write_inventory(&mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "domain,tracker_ids,campaign_ids,patterns\n"
        );
    }

    #[test]
    fn test_uncommitted_stage_is_removed() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("inventory.csv");
        fs::write(&target, "previous\n").unwrap();

        let staged = stage_file(&target, |out| write_inventory(out, &[])).unwrap();
        assert!(dir.path().join("inventory.csv.tmp").exists());
        drop(staged);

        assert!(!dir.path().join("inventory.csv.tmp").exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "previous\n");
    }

    #[test]
    fn test_staging_path() {
        assert_eq!(
            staging_path(Path::new("out/tracker_regex.csv")).unwrap(),
            PathBuf::from("out/tracker_regex.csv.tmp")
        );
        assert!(staging_path(Path::new("/")).is_err());
    }
}

//! CSV dataset source.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{RawRow, RecordSource};
use crate::error::{Error, Result};
use crate::record::AircraftRecord;

/// Records stored in a CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    /// Create a source reading from `path`. Nothing is read until `load`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the path to the CSV file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn load(&self) -> Result<Vec<AircraftRecord>> {
        let file = std::fs::File::open(&self.path).map_err(|source| Error::DatasetRead {
            path: self.path.clone(),
            source,
        })?;
        let records = parse_csv(file)?;
        debug!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

/// Parse CSV records from any reader.
///
/// Fields are trimmed, empty cells are absent values, and unknown columns are
/// ignored. Lines are counted from the first data row.
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] for rows that do not fit the record
/// model and [`Error::Csv`] for structural CSV problems.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<AircraftRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line, row) in (1_u64..).zip(reader.deserialize::<RawRow>()) {
        let row = row.map_err(|err| {
            if let csv::ErrorKind::Deserialize { err: field_err, .. } = err.kind() {
                return Error::malformed(line, field_err.to_string());
            }
            Error::Csv(err)
        })?;
        records.push(row.into_record(line)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
callsign,tail,icao24,lat,lon,baro_altitude_m,velocity_ms,last_seen_utc
DAL123,N1AA,a1b2c3,33.64,-84.43,10668.0,230.5,2024-05-01T12:00:00Z
DAL123,N2BB,a1b2c4,,,,,
UAL45,,c0ffee,41.97,-87.90,3048,120,2024-05-01T12:01:00Z
";

    #[test]
    fn test_parse_sample() {
        let records = parse_csv(SAMPLE.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].callsign, "DAL123");
        assert_eq!(records[0].tail.as_deref(), Some("N1AA"));
        assert_eq!(records[0].altitude_m, Some(10668.0));
        assert!(records[0].position.is_some());

        assert!(records[1].position.is_none());
        assert!(records[1].last_seen_utc.is_none());

        assert_eq!(records[2].callsign, "UAL45");
        assert!(records[2].tail.is_none());
    }

    #[test]
    fn test_parse_preserves_order_and_duplicates() {
        let records = parse_csv(SAMPLE.as_bytes()).unwrap();
        let tails: Vec<_> = records.iter().map(|r| r.tail.as_deref()).collect();
        assert_eq!(tails, vec![Some("N1AA"), Some("N2BB"), None]);
    }

    #[test]
    fn test_parse_trims_fields() {
        let csv = "callsign,tail\n  SWA9 ,  N7AA \n";
        let records = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(records[0].callsign, "SWA9");
        assert_eq!(records[0].tail.as_deref(), Some("N7AA"));
    }

    #[test]
    fn test_parse_accepts_altitude_alias_and_extra_columns() {
        let csv = "callsign,altitude_m,squawk\nJBU7,900.5,7700\n";
        let records = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(records[0].altitude_m, Some(900.5));
    }

    #[test]
    fn test_parse_half_position_is_malformed() {
        let csv = "callsign,lat,lon\nOK1,1.0,2.0\nBAD1,1.0,\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { line: 2, .. }));
        assert!(err.is_dataset_error());
    }

    #[test]
    fn test_parse_bad_number_is_malformed() {
        let csv = "callsign,velocity_ms\nOK1,1.5\nBAD1,fast\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        match err {
            Error::MalformedRecord { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_ragged_row_is_csv_error() {
        let csv = "callsign,tail\nA,B,C\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn test_parse_header_only_is_empty() {
        let records = parse_csv("callsign,tail\n".as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_dataset_read_error() {
        let source = CsvSource::new("/nonexistent/adsb_sample.csv");
        let err = source.load().unwrap_err();
        assert!(matches!(err, Error::DatasetRead { .. }));
        assert_eq!(source.describe(), "csv:/nonexistent/adsb_sample.csv");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adsb.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let source = CsvSource::new(&path);
        assert_eq!(source.path(), path.as_path());
        assert_eq!(source.load().unwrap().len(), 3);
    }
}

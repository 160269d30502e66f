//! Dataset sources.
//!
//! A [`RecordSource`] is the read-only collaborator that supplies the full set
//! of aircraft records. Two formats are supported:
//!
//! - **CSV**: a flat file with a header row, as exported by the feed.
//! - **`SQLite`**: a single `aircraft` table read in row order.
//!
//! Sources only load; they never write. Load failures are returned as dataset
//! errors and are never turned into an empty record set.

mod csv_file;
pub mod schema;
mod sqlite;

use std::path::Path;

use serde::Deserialize;

use crate::config::{DatasetConfig, DatasetFormat};
use crate::error::{Error, Result};
use crate::record::{AircraftRecord, Position};

pub use csv_file::{parse_csv, CsvSource};
pub use sqlite::SqliteSource;

/// A read-only supplier of aircraft records.
///
/// `load` is blocking; async callers run it on a blocking thread (see
/// [`DatasetProvider`](crate::dataset::DatasetProvider)).
pub trait RecordSource: Send + Sync + std::fmt::Debug {
    /// The name of this source kind (for logging).
    fn name(&self) -> &'static str;

    /// Human-readable description of where records come from.
    fn describe(&self) -> String;

    /// Load every record, preserving the stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read or a record is
    /// malformed.
    fn load(&self) -> Result<Vec<AircraftRecord>>;
}

/// Build the source described by the dataset configuration.
#[must_use]
pub fn open_source(config: &DatasetConfig) -> Box<dyn RecordSource> {
    match config.resolved_format() {
        DatasetFormat::Sqlite => Box::new(SqliteSource::new(&config.path)),
        DatasetFormat::Csv | DatasetFormat::Auto => Box::new(CsvSource::new(&config.path)),
    }
}

/// Guess the format of a dataset file from its extension.
#[must_use]
pub fn detect_format(path: &Path) -> DatasetFormat {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("db" | "sqlite" | "sqlite3") => DatasetFormat::Sqlite,
        _ => DatasetFormat::Csv,
    }
}

/// One stored row before validation.
///
/// Column names follow the feed export; `altitude_m` is accepted as an alias
/// of `baro_altitude_m`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawRow {
    #[serde(default)]
    pub callsign: Option<String>,
    #[serde(default)]
    pub tail: Option<String>,
    #[serde(default)]
    pub icao24: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default, alias = "altitude_m")]
    pub baro_altitude_m: Option<f64>,
    #[serde(default)]
    pub velocity_ms: Option<f64>,
    #[serde(default)]
    pub last_seen_utc: Option<String>,
}

impl RawRow {
    /// Validate the row and convert it into a record.
    pub(crate) fn into_record(self, line: u64) -> Result<AircraftRecord> {
        let position =
            Position::from_parts(self.lat, self.lon).map_err(|msg| Error::malformed(line, msg))?;
        Ok(AircraftRecord {
            callsign: self.callsign.map(|c| c.trim().to_string()).unwrap_or_default(),
            tail: non_empty(self.tail),
            icao24: non_empty(self.icao24),
            position,
            altitude_m: self.baro_altitude_m,
            velocity_ms: self.velocity_ms,
            last_seen_utc: non_empty(self.last_seen_utc),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("data/adsb.csv")), DatasetFormat::Csv);
        assert_eq!(detect_format(Path::new("data/adsb.db")), DatasetFormat::Sqlite);
        assert_eq!(
            detect_format(Path::new("data/adsb.SQLITE3")),
            DatasetFormat::Sqlite
        );
        assert_eq!(detect_format(Path::new("data/adsb")), DatasetFormat::Csv);
    }

    #[test]
    fn test_open_source_picks_format() {
        let mut config = DatasetConfig {
            path: PathBuf::from("flights.sqlite"),
            ..DatasetConfig::default()
        };
        assert_eq!(open_source(&config).name(), "sqlite");

        config.format = DatasetFormat::Csv;
        assert_eq!(open_source(&config).name(), "csv");

        config.path = PathBuf::from("flights.csv");
        config.format = DatasetFormat::Auto;
        assert_eq!(open_source(&config).name(), "csv");
    }

    #[test]
    fn test_raw_row_into_record() {
        let row = RawRow {
            callsign: Some(" DAL123 ".to_string()),
            tail: Some(String::new()),
            icao24: Some("a1b2c3".to_string()),
            lat: Some(33.6),
            lon: Some(-84.4),
            ..RawRow::default()
        };
        let record = row.into_record(1).unwrap();

        assert_eq!(record.callsign, "DAL123");
        assert!(record.tail.is_none());
        assert_eq!(record.icao24.as_deref(), Some("a1b2c3"));
        assert!(record.position.is_some());
    }

    #[test]
    fn test_raw_row_half_position_is_malformed() {
        let row = RawRow {
            callsign: Some("X".to_string()),
            lat: Some(1.0),
            ..RawRow::default()
        };
        let err = row.into_record(7).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { line: 7, .. }));
    }

    #[test]
    fn test_raw_row_missing_callsign_is_empty() {
        let record = RawRow::default().into_record(1).unwrap();
        assert_eq!(record.callsign, "");
    }
}

//! `SQLite` dataset source.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use super::schema::{AIRCRAFT_TABLE, SELECT_AIRCRAFT};
use super::{RawRow, RecordSource};
use crate::error::{Error, Result};
use crate::record::AircraftRecord;

/// Records stored in the `aircraft` table of a `SQLite` database.
///
/// The database is always opened read-only.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    /// Create a source reading from the database at `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| Error::DatabaseOpen {
            path: self.path.clone(),
            source,
        })
    }
}

impl RecordSource for SqliteSource {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    fn load(&self) -> Result<Vec<AircraftRecord>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(SELECT_AIRCRAFT)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RawRow {
                    callsign: row.get(0)?,
                    tail: row.get(1)?,
                    icao24: row.get(2)?,
                    lat: row.get(3)?,
                    lon: row.get(4)?,
                    baro_altitude_m: row.get(5)?,
                    velocity_ms: row.get(6)?,
                    last_seen_utc: row.get(7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let records = (1_u64..)
            .zip(rows)
            .map(|(line, row)| row.into_record(line))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Loaded {} records from {} table in {}",
            records.len(),
            AIRCRAFT_TABLE,
            self.path.display()
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::schema::{CREATE_AIRCRAFT_TABLE, INSERT_AIRCRAFT};
    use rusqlite::params;

    fn seed(path: &Path, rows: &[(&str, Option<&str>, Option<f64>, Option<f64>)]) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(CREATE_AIRCRAFT_TABLE).unwrap();
        for (callsign, tail, lat, lon) in rows {
            conn.execute(
                INSERT_AIRCRAFT,
                params![
                    callsign,
                    tail,
                    Option::<String>::None,
                    lat,
                    lon,
                    Some(1000.0),
                    Option::<f64>::None,
                    "2024-05-01T12:00:00Z"
                ],
            )
            .unwrap();
        }
    }

    #[test]
    fn test_load_in_row_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adsb.db");
        seed(
            &path,
            &[
                ("DAL123", Some("N1AA"), Some(33.6), Some(-84.4)),
                ("DAL123", Some("N2BB"), None, None),
                ("UAL45", None, None, None),
            ],
        );

        let records = SqliteSource::new(&path).load().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].tail.as_deref(), Some("N1AA"));
        assert!(records[0].position.is_some());
        assert_eq!(records[0].altitude_m, Some(1000.0));
        assert_eq!(records[1].tail.as_deref(), Some("N2BB"));
        assert!(records[2].tail.is_none());
        assert_eq!(
            records[2].last_seen_utc.as_deref(),
            Some("2024-05-01T12:00:00Z")
        );
    }

    #[test]
    fn test_half_position_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adsb.db");
        seed(&path, &[("OK1", None, None, None), ("BAD1", None, None, Some(2.0))]);

        let err = SqliteSource::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn test_missing_database_is_open_error() {
        let source = SqliteSource::new("/nonexistent/adsb.db");
        let err = source.load().unwrap_err();
        assert!(matches!(err, Error::DatabaseOpen { .. }));
        assert!(err.is_dataset_error());
    }

    #[test]
    fn test_missing_table_is_query_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE other (x INTEGER)")
            .unwrap();

        let err = SqliteSource::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::DatabaseQuery(_)));
    }

    #[test]
    fn test_describe() {
        let source = SqliteSource::new("/data/adsb.db");
        assert_eq!(source.name(), "sqlite");
        assert_eq!(source.describe(), "sqlite:/data/adsb.db");
        assert_eq!(source.path(), Path::new("/data/adsb.db"));
    }
}

//! `SQLite` schema for the aircraft dataset.
//!
//! The lookup service only reads this table. The DDL is exported so that
//! import tooling and test fixtures create a compatible database.

/// Name of the table holding aircraft records.
pub const AIRCRAFT_TABLE: &str = "aircraft";

/// SQL statement to create the aircraft table.
pub const CREATE_AIRCRAFT_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS aircraft (
    callsign TEXT NOT NULL DEFAULT '',
    tail TEXT,
    icao24 TEXT,
    lat REAL,
    lon REAL,
    baro_altitude_m REAL,
    velocity_ms REAL,
    last_seen_utc TEXT
)
";

/// SQL statement to insert one aircraft row, in column order.
pub const INSERT_AIRCRAFT: &str = r"
INSERT INTO aircraft (callsign, tail, icao24, lat, lon, baro_altitude_m, velocity_ms, last_seen_utc)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
";

/// SQL statement to read every aircraft row in insertion order.
pub const SELECT_AIRCRAFT: &str = r"
SELECT callsign, tail, icao24, lat, lon, baro_altitude_m, velocity_ms, last_seen_utc
FROM aircraft ORDER BY rowid
";

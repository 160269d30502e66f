//! Aircraft record types.
//!
//! An [`AircraftRecord`] is the last known state of one aircraft as reported
//! by the external flight data feed. Records are read-only: they are loaded
//! wholesale from a [`RecordSource`](crate::source::RecordSource) and never
//! created, mutated, or deleted by this crate.

use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude, positive north.
    pub latitude: f64,
    /// Longitude, positive east.
    pub longitude: f64,
}

impl Position {
    /// Build a position from independently optional coordinates.
    ///
    /// Returns `Ok(None)` when both are absent and `Err` when only one is set.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when exactly one coordinate is present.
    pub fn from_parts(
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> std::result::Result<Option<Self>, &'static str> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Ok(Some(Self {
                latitude,
                longitude,
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err("latitude present without longitude"),
            (None, Some(_)) => Err("longitude present without latitude"),
        }
    }
}

/// The last known state of one aircraft.
///
/// Neither `callsign` nor `tail` is a unique key: duplicates coexist in a
/// dataset and are all returned by a matching query.
///
/// On the wire the position is flattened into `lat`/`lon` and absent optional
/// fields are serialized as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireRecord", into = "WireRecord")]
pub struct AircraftRecord {
    /// Flight callsign. May be empty.
    pub callsign: String,
    /// Registration (tail number).
    pub tail: Option<String>,
    /// ICAO 24-bit transponder address, hex encoded.
    pub icao24: Option<String>,
    /// Last reported position.
    pub position: Option<Position>,
    /// Barometric altitude in metres.
    pub altitude_m: Option<f64>,
    /// Ground speed in metres per second.
    pub velocity_ms: Option<f64>,
    /// Timestamp of the last report, as supplied by the feed.
    pub last_seen_utc: Option<String>,
}

impl AircraftRecord {
    /// Create a record with only a callsign and an optional tail.
    #[must_use]
    pub fn new(callsign: impl Into<String>, tail: Option<&str>) -> Self {
        Self {
            callsign: callsign.into(),
            tail: tail.map(str::to_string),
            ..Self::default()
        }
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.position = Some(Position {
            latitude,
            longitude,
        });
        self
    }

    /// Display label used by list views: the callsign, or the tail when the
    /// callsign is empty.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.callsign.is_empty() {
            self.tail.as_deref().unwrap_or("")
        } else {
            &self.callsign
        }
    }
}

/// Flat JSON shape of an [`AircraftRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WireRecord {
    #[serde(default)]
    callsign: Option<String>,
    #[serde(default)]
    tail: Option<String>,
    #[serde(default)]
    icao24: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    altitude_m: Option<f64>,
    #[serde(default)]
    velocity_ms: Option<f64>,
    #[serde(default)]
    last_seen_utc: Option<String>,
}

impl From<AircraftRecord> for WireRecord {
    fn from(record: AircraftRecord) -> Self {
        Self {
            callsign: Some(record.callsign),
            tail: record.tail,
            icao24: record.icao24,
            lat: record.position.map(|p| p.latitude),
            lon: record.position.map(|p| p.longitude),
            altitude_m: record.altitude_m,
            velocity_ms: record.velocity_ms,
            last_seen_utc: record.last_seen_utc,
        }
    }
}

impl From<WireRecord> for AircraftRecord {
    // A half position from a remote service is dropped rather than rejected.
    fn from(wire: WireRecord) -> Self {
        Self {
            callsign: wire.callsign.unwrap_or_default(),
            tail: wire.tail,
            icao24: wire.icao24,
            position: Position::from_parts(wire.lat, wire.lon).unwrap_or(None),
            altitude_m: wire.altitude_m,
            velocity_ms: wire.velocity_ms,
            last_seen_utc: wire.last_seen_utc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_from_parts() {
        assert_eq!(Position::from_parts(None, None), Ok(None));
        assert_eq!(
            Position::from_parts(Some(40.6), Some(-73.8)),
            Ok(Some(Position {
                latitude: 40.6,
                longitude: -73.8
            }))
        );
        assert!(Position::from_parts(Some(40.6), None).is_err());
        assert!(Position::from_parts(None, Some(-73.8)).is_err());
    }

    #[test]
    fn test_record_new() {
        let record = AircraftRecord::new("DAL123", Some("N1AA"));
        assert_eq!(record.callsign, "DAL123");
        assert_eq!(record.tail.as_deref(), Some("N1AA"));
        assert!(record.position.is_none());
        assert!(record.icao24.is_none());
    }

    #[test]
    fn test_record_label() {
        assert_eq!(AircraftRecord::new("UAL45", None).label(), "UAL45");
        assert_eq!(AircraftRecord::new("", Some("N2BB")).label(), "N2BB");
        assert_eq!(AircraftRecord::new("", None).label(), "");
    }

    #[test]
    fn test_serialize_flat_shape_with_nulls() {
        let record = AircraftRecord::new("UAL45", None);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["callsign"], "UAL45");
        assert!(json["tail"].is_null());
        assert!(json["lat"].is_null());
        assert!(json["lon"].is_null());
        assert!(json["altitude_m"].is_null());
        assert!(json.get("position").is_none());
    }

    #[test]
    fn test_serialize_position_as_lat_lon() {
        let record = AircraftRecord::new("DAL123", Some("N1AA")).with_position(33.64, -84.43);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["lat"], 33.64);
        assert_eq!(json["lon"], -84.43);
    }

    #[test]
    fn test_deserialize_from_service_payload() {
        let json = r#"{
            "callsign": "DAL123",
            "tail": "N1AA",
            "icao24": "a1b2c3",
            "lat": 33.64,
            "lon": -84.43,
            "altitude_m": 10668.0,
            "velocity_ms": 230.5,
            "last_seen_utc": "2024-05-01T12:00:00Z"
        }"#;
        let record: AircraftRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.callsign, "DAL123");
        assert_eq!(record.icao24.as_deref(), Some("a1b2c3"));
        assert_eq!(
            record.position,
            Some(Position {
                latitude: 33.64,
                longitude: -84.43
            })
        );
        assert_eq!(record.velocity_ms, Some(230.5));
    }

    #[test]
    fn test_deserialize_drops_half_position() {
        let json = r#"{"callsign": "X", "lat": 1.0, "lon": null}"#;
        let record: AircraftRecord = serde_json::from_str(json).unwrap();
        assert!(record.position.is_none());
    }

    #[test]
    fn test_deserialize_null_callsign_is_empty() {
        let json = r#"{"callsign": null, "tail": "N9ZZ"}"#;
        let record: AircraftRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.callsign, "");
        assert_eq!(record.label(), "N9ZZ");
    }
}

//! Query normalization.
//!
//! Raw user input arrives with arbitrary casing and whitespace. Normalizing
//! trims each field and drops it when nothing is left; casing is preserved
//! because matching is case-insensitive.

use serde::{Deserialize, Serialize};

use crate::record::AircraftRecord;

/// A normalized search query.
///
/// Present fields are never empty and never carry surrounding whitespace.
/// A query with no fields is the "browse all" query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    /// Callsign to match exactly, ignoring case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    /// Tail number to match exactly, ignoring case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail: Option<String>,
}

/// Which fields a query filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Neither field is set.
    None,
    /// Only the callsign is set.
    Callsign,
    /// Only the tail is set.
    Tail,
    /// Both fields are set.
    Both,
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Callsign => write!(f, "callsign"),
            Self::Tail => write!(f, "tail"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl Query {
    /// Normalize two raw input strings.
    ///
    /// Every input is valid; empty or whitespace-only strings become absent
    /// fields.
    #[must_use]
    pub fn normalize(raw_callsign: &str, raw_tail: &str) -> Self {
        Self {
            callsign: normalize_field(raw_callsign),
            tail: normalize_field(raw_tail),
        }
    }

    /// Normalize optional raw inputs, as they arrive from query strings or
    /// command-line flags. `None` and `Some("")` are equivalent.
    #[must_use]
    pub fn from_optional(raw_callsign: Option<&str>, raw_tail: Option<&str>) -> Self {
        Self::normalize(raw_callsign.unwrap_or(""), raw_tail.unwrap_or(""))
    }

    /// The query that looks up a previously selected record again.
    ///
    /// A record with an empty callsign and no tail has nothing to filter on
    /// and yields the browse-all query; callers that need a single record
    /// check [`Query::is_browse_all`] first.
    #[must_use]
    pub fn for_record(record: &AircraftRecord) -> Self {
        Self::from_optional(Some(&record.callsign), record.tail.as_deref())
    }

    /// The "browse all" query.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Which fields this query filters on.
    #[must_use]
    pub fn kind(&self) -> QueryKind {
        match (&self.callsign, &self.tail) {
            (None, None) => QueryKind::None,
            (Some(_), None) => QueryKind::Callsign,
            (None, Some(_)) => QueryKind::Tail,
            (Some(_), Some(_)) => QueryKind::Both,
        }
    }

    /// Check if this query returns every record.
    #[must_use]
    pub fn is_browse_all(&self) -> bool {
        self.kind() == QueryKind::None
    }
}

fn normalize_field(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

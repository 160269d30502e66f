//! Record resolution.
//!
//! [`resolve`] is a stable filter over the full dataset: no index, no
//! re-ranking. Each present query field must equal the corresponding record
//! field ignoring case; an absent record field never matches.
//!
//! [`Detail`] composes the resolver for single-record views and reports how
//! many records matched so that presentation layers can flag ambiguity.

use serde::{Deserialize, Serialize};

use crate::query::Query;
use crate::record::AircraftRecord;

impl Query {
    /// Check if a record satisfies every present field of this query.
    #[must_use]
    pub fn matches(&self, record: &AircraftRecord) -> bool {
        let callsign_ok = self
            .callsign
            .as_deref()
            .is_none_or(|wanted| eq_ignore_case(&record.callsign, wanted));
        let tail_ok = self.tail.as_deref().is_none_or(|wanted| {
            record
                .tail
                .as_deref()
                .is_some_and(|tail| eq_ignore_case(tail, wanted))
        });
        callsign_ok && tail_ok
    }
}

/// Return the records matching `query`, in dataset order.
///
/// The browse-all query returns every record.
#[must_use]
pub fn resolve<'a>(query: &Query, records: &'a [AircraftRecord]) -> Vec<&'a AircraftRecord> {
    records.iter().filter(|record| query.matches(record)).collect()
}

/// Unicode-aware case-insensitive equality without allocating.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// How many records a detail lookup matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// The record is no longer in the dataset.
    NotFound,
    /// Exactly one record matched.
    Unique,
    /// Several records share the callsign/tail pair; the first was chosen.
    Ambiguous,
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Unique => write!(f, "unique"),
            Self::Ambiguous => write!(f, "ambiguous"),
        }
    }
}

/// The outcome of a detail lookup: the chosen record plus how it was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    /// Cardinality of the underlying result.
    pub cardinality: Cardinality,
    /// Number of records that matched.
    pub matches: usize,
    /// The first matching record in dataset order.
    pub record: Option<AircraftRecord>,
}

impl Detail {
    /// Select the first of an already resolved result sequence.
    #[must_use]
    pub fn from_matches<'a, I>(matches: I) -> Self
    where
        I: IntoIterator<Item = &'a AircraftRecord>,
    {
        let mut iter = matches.into_iter();
        let record = iter.next().cloned();
        let count = if record.is_some() { 1 + iter.count() } else { 0 };
        Self::with_count(record, count)
    }

    /// The outcome when no record matched.
    #[must_use]
    pub fn not_found() -> Self {
        Self::with_count(None, 0)
    }

    /// Build from an owned result list, taking its first element.
    #[must_use]
    pub fn from_records(records: Vec<AircraftRecord>) -> Self {
        let count = records.len();
        Self::with_count(records.into_iter().next(), count)
    }

    fn with_count(record: Option<AircraftRecord>, count: usize) -> Self {
        let cardinality = match count {
            0 => Cardinality::NotFound,
            1 => Cardinality::Unique,
            _ => Cardinality::Ambiguous,
        };
        Self {
            cardinality,
            matches: count,
            record,
        }
    }

    /// Check if the chosen record was one of several candidates.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.cardinality == Cardinality::Ambiguous
    }
}

/// Resolve `query` and pick the first match for a detail view.
#[must_use]
pub fn resolve_detail(query: &Query, records: &[AircraftRecord]) -> Detail {
    Detail::from_matches(records.iter().filter(|record| query.matches(record)))
}

//! Dataset snapshots and the policy for loading them.
//!
//! A [`Dataset`] is an immutable snapshot of every record. The
//! [`DatasetProvider`] owns the [`RecordSource`] and decides whether a snapshot
//! is loaded once and shared for the process lifetime or reloaded per request.
//! Either way the blocking load runs on a blocking thread under a timeout, so a
//! hung file system read surfaces as [`Error::DatasetTimeout`] instead of
//! stalling the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::query::Query;
use crate::record::AircraftRecord;
use crate::resolve::{resolve, resolve_detail, Detail};
use crate::source::RecordSource;

/// An immutable snapshot of the dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<[AircraftRecord]>,
    loaded_at: DateTime<Utc>,
    fingerprint: String,
    source: String,
}

impl Dataset {
    /// Wrap loaded records into a snapshot.
    #[must_use]
    pub fn new(records: Vec<AircraftRecord>, source: impl Into<String>) -> Self {
        let fingerprint = fingerprint(&records);
        Self {
            records: records.into(),
            loaded_at: Utc::now(),
            fingerprint,
            source: source.into(),
        }
    }

    /// All records in dataset order.
    #[must_use]
    pub fn records(&self) -> &[AircraftRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// When this snapshot was loaded.
    #[must_use]
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// BLAKE3 hash over the records, stable for identical content.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Description of the source this snapshot was loaded from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Records matching `query`, in dataset order.
    #[must_use]
    pub fn search(&self, query: &Query) -> Vec<&AircraftRecord> {
        resolve(query, &self.records)
    }

    /// First record matching `query`, with the match cardinality.
    #[must_use]
    pub fn detail(&self, query: &Query) -> Detail {
        resolve_detail(query, &self.records)
    }
}

fn fingerprint(records: &[AircraftRecord]) -> String {
    let mut hasher = blake3::Hasher::new();
    for record in records {
        // Serializing a plain record cannot fail.
        if let Ok(bytes) = serde_json::to_vec(record) {
            hasher.update(&bytes);
        }
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

/// Load `source` on a blocking thread, bounded by `timeout`.
///
/// A blocking load cannot be cancelled: after a timeout the caller gets
/// its error immediately but the load keeps its thread until the source
/// returns. With per-request reloading a hung store can therefore occupy
/// one blocking thread per timed-out request.
///
/// # Errors
///
/// Returns [`Error::DatasetTimeout`] when the bound is exceeded, or the
/// source's own error when loading fails.
pub async fn load_with_timeout(
    source: Arc<dyn RecordSource>,
    timeout: Duration,
) -> Result<Dataset> {
    let description = source.describe();
    let task = tokio::task::spawn_blocking(move || source.load());

    let records = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_err)) => {
            return Err(Error::internal(format!("dataset load task failed: {join_err}")))
        }
        Err(_) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            warn!("Dataset load from {} timed out after {}ms", description, timeout_ms);
            return Err(Error::DatasetTimeout { timeout_ms });
        }
    };

    debug!("Loaded {} records from {}", records.len(), description);
    Ok(Dataset::new(records, description))
}

/// How snapshots are obtained.
#[derive(Debug)]
enum Mode {
    /// Loaded once; shared for the process lifetime.
    Cached(Dataset),
    /// Loaded on every call.
    PerRequest,
}

/// Supplies dataset snapshots to request handlers.
#[derive(Debug)]
pub struct DatasetProvider {
    source: Arc<dyn RecordSource>,
    timeout: Duration,
    mode: Mode,
}

impl DatasetProvider {
    /// Load the dataset once and serve the same snapshot from then on.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial load fails or times out.
    pub async fn cached(source: Arc<dyn RecordSource>, timeout: Duration) -> Result<Self> {
        let dataset = load_with_timeout(Arc::clone(&source), timeout).await?;
        info!(
            "Dataset loaded from {} ({} records)",
            dataset.source(),
            dataset.len()
        );
        Ok(Self {
            source,
            timeout,
            mode: Mode::Cached(dataset),
        })
    }

    /// Reload the dataset on every [`DatasetProvider::snapshot`] call.
    #[must_use]
    pub fn per_request(source: Arc<dyn RecordSource>, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            mode: Mode::PerRequest,
        }
    }

    /// Serve an already loaded snapshot.
    #[must_use]
    pub fn from_dataset(dataset: Dataset, source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            timeout: Duration::from_secs(5),
            mode: Mode::Cached(dataset),
        }
    }

    /// Check if the dataset is reloaded per request.
    #[must_use]
    pub fn is_per_request(&self) -> bool {
        matches!(self.mode, Mode::PerRequest)
    }

    /// Description of the underlying source.
    #[must_use]
    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Get a snapshot to resolve a request against.
    ///
    /// # Errors
    ///
    /// In per-request mode, returns the load error or timeout. Cached mode
    /// never fails here.
    pub async fn snapshot(&self) -> Result<Dataset> {
        match &self.mode {
            Mode::Cached(dataset) => Ok(dataset.clone()),
            Mode::PerRequest => load_with_timeout(Arc::clone(&self.source), self.timeout).await,
        }
    }
}

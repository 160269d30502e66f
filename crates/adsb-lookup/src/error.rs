//! Error types for adsb-lookup.
//!
//! Dataset failures are kept distinct from everything else so that callers can
//! tell "could not search" apart from "no matches", which is never an error.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for adsb-lookup operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Dataset Errors ===
    /// The dataset file could not be opened or read.
    #[error("failed to read dataset at {path}: {source}")]
    DatasetRead {
        /// Path to the dataset file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV dataset could not be parsed.
    #[error("failed to parse CSV dataset: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to open the `SQLite` dataset.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// A record in the dataset violates the data model.
    #[error("malformed record at line {line}: {message}")]
    MalformedRecord {
        /// 1-based data line (header excluded) or row number.
        line: u64,
        /// Description of the problem.
        message: String,
    },

    /// Loading the dataset took longer than the configured bound.
    #[error("dataset load timed out after {timeout_ms}ms")]
    DatasetTimeout {
        /// The timeout that was exceeded.
        timeout_ms: u64,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === HTTP Client Errors ===
    /// The request could not reach the lookup service.
    #[error("request to lookup service failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The lookup service answered with a non-success status.
    #[error("lookup service returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message reported by the service.
        message: String,
    },

    // === I/O Errors ===
    /// File system or socket operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for adsb-lookup operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a malformed record error.
    #[must_use]
    pub fn malformed(line: u64, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            message: message.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error came from the dataset collaborator.
    #[must_use]
    pub fn is_dataset_error(&self) -> bool {
        matches!(
            self,
            Self::DatasetRead { .. }
                | Self::Csv(_)
                | Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::MalformedRecord { .. }
                | Self::DatasetTimeout { .. }
        )
    }

    /// Check if this error means the lookup service could not be reached
    /// or refused the request.
    #[must_use]
    pub fn is_remote_error(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Api { .. })
    }

    /// Short machine-readable kind, used in API error bodies and telemetry.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DatasetRead { .. } => "dataset_read",
            Self::Csv(_) => "dataset_csv",
            Self::DatabaseOpen { .. } | Self::DatabaseQuery(_) => "dataset_sqlite",
            Self::MalformedRecord { .. } => "malformed_record",
            Self::DatasetTimeout { .. } => "dataset_timeout",
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => "config",
            Self::Http(_) => "http",
            Self::Api { .. } => "api",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Internal(_) => "internal",
        }
    }
}

//! `adsb-lookup` - Find aircraft in an ADS-B snapshot by callsign or tail number
//!
//! This library provides the query normalizer and record resolver, the dataset
//! sources and loader, the HTTP lookup API, and a client for that API.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod query;
pub mod record;
pub mod resolve;
pub mod server;
pub mod source;
pub mod telemetry;

pub use client::{ApiClient, Meta};
pub use config::Config;
pub use dataset::{load_with_timeout, Dataset, DatasetProvider};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use query::{Query, QueryKind};
pub use record::{AircraftRecord, Position};
pub use resolve::{resolve, resolve_detail, Cardinality, Detail};
pub use source::RecordSource;
pub use telemetry::Telemetry;

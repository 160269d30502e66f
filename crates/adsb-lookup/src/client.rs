//! HTTP client for the lookup API.
//!
//! The base address is resolved once at the process boundary (see
//! [`Config::api_base`](crate::config::Config::api_base)) and injected here.
//! Transport failures and non-2xx answers are errors; an empty list is a
//! successful search with no matches.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::query::Query;
use crate::record::AircraftRecord;
use crate::resolve::Detail;

/// Response of `GET /meta`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Meta {
    /// Number of records in the dataset.
    pub rows: usize,
    /// When the dataset was loaded.
    pub data_last_updated: String,
    /// Content fingerprint of the dataset.
    #[serde(default)]
    pub fingerprint: Option<String>,
    /// Where the dataset was loaded from.
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Client for a running lookup service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the service at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base: base.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// The base address requests are sent to.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Search for aircraft.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or answers non-2xx.
    pub async fn search(&self, query: &Query, limit: Option<usize>) -> Result<Vec<AircraftRecord>> {
        let mut params = query_params(query);
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        let response = self
            .http
            .get(format!("{}/aircraft", self.base))
            .query(&params)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Look up a previously selected record again for a detail view.
    ///
    /// The record's own callsign and tail are searched; the first result is
    /// chosen and the result cardinality is reported. A record with neither
    /// a callsign nor a tail cannot be found again and is reported as not
    /// found without a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or answers non-2xx.
    pub async fn detail(&self, selected: &AircraftRecord) -> Result<Detail> {
        let query = Query::for_record(selected);
        if query.is_browse_all() {
            return Ok(Detail::not_found());
        }
        self.detail_for(&query).await
    }

    /// Detail lookup for an arbitrary query.
    ///
    /// The service counts every match, so the cardinality is not bounded by
    /// the search page size.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or answers non-2xx.
    pub async fn detail_for(&self, query: &Query) -> Result<Detail> {
        let response = self
            .http
            .get(format!("{}/aircraft/detail", self.base))
            .query(&query_params(query))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Fetch dataset metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or answers non-2xx.
    pub async fn meta(&self) -> Result<Meta> {
        let response = self.http.get(format!("{}/meta", self.base)).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message.or(body.detail))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

fn query_params(query: &Query) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(callsign) = &query.callsign {
        params.push(("callsign", callsign.clone()));
    }
    if let Some(tail) = &query.tail {
        params.push(("tail", tail.clone()));
    }
    params
}

//! Structured search telemetry.
//!
//! Every event is logged locally through `tracing` on the
//! `adsb_lookup::events` target. When a Splunk HTTP Event Collector is
//! configured the event is also forwarded on a detached task. Forwarding is
//! best effort: failures are logged at debug level and never reach the
//! request path.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::TelemetryConfig;
use crate::query::{Query, QueryKind};

/// Tracing target used for telemetry events.
pub const EVENT_TARGET: &str = "adsb_lookup::events";

/// Outcome recorded in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// The request succeeded.
    Ok,
    /// The request failed.
    Error,
}

/// A completed `/aircraft` search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchEvent {
    /// Always `aircraft_search`.
    pub event: &'static str,
    /// Which fields the query used.
    pub query_type: QueryKind,
    /// Normalized callsign.
    pub callsign: Option<String>,
    /// Normalized tail.
    pub tail: Option<String>,
    /// Records returned.
    pub rowcount: usize,
    /// Handler duration.
    pub duration_ms: u64,
    /// Outcome.
    pub status: EventStatus,
    /// Application version tag.
    pub app_version: String,
}

impl SearchEvent {
    /// Build a success event.
    #[must_use]
    pub fn ok(query: &Query, rowcount: usize, duration_ms: u64, app_version: &str) -> Self {
        Self {
            event: "aircraft_search",
            query_type: query.kind(),
            callsign: query.callsign.clone(),
            tail: query.tail.clone(),
            rowcount,
            duration_ms,
            status: EventStatus::Ok,
            app_version: app_version.to_string(),
        }
    }
}

/// A failed request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    /// Always `error`.
    pub event: &'static str,
    /// Route that failed.
    pub route: &'static str,
    /// Which fields the query used.
    pub query_type: QueryKind,
    /// Normalized callsign.
    pub callsign: Option<String>,
    /// Normalized tail.
    pub tail: Option<String>,
    /// Requested limit.
    pub limit: usize,
    /// Handler duration.
    pub duration_ms: u64,
    /// Outcome.
    pub status: EventStatus,
    /// Error kind.
    pub error_type: &'static str,
    /// Error message.
    pub error_msg: String,
}

impl ErrorEvent {
    /// Build an error event for `route`.
    #[must_use]
    pub fn new(
        route: &'static str,
        query: &Query,
        limit: usize,
        duration_ms: u64,
        error: &crate::Error,
    ) -> Self {
        Self {
            event: "error",
            route,
            query_type: query.kind(),
            callsign: query.callsign.clone(),
            tail: query.tail.clone(),
            limit,
            duration_ms,
            status: EventStatus::Error,
            error_type: error.kind(),
            error_msg: error.to_string(),
        }
    }
}

/// Emits events locally and, when configured, to Splunk HEC.
#[derive(Debug, Clone)]
pub struct Telemetry {
    config: Arc<TelemetryConfig>,
    http: Option<reqwest::Client>,
}

impl Telemetry {
    /// Create an emitter.
    ///
    /// A HEC client is only built when both URL and token are configured.
    #[must_use]
    pub fn new(config: TelemetryConfig) -> Self {
        let http = if config.hec_enabled() {
            reqwest::Client::builder()
                .timeout(config.timeout())
                .danger_accept_invalid_certs(!config.verify_tls)
                .build()
                .map_err(|e| debug!("HEC client unavailable: {e}"))
                .ok()
        } else {
            None
        };
        Self {
            config: Arc::new(config),
            http,
        }
    }

    /// An emitter that only logs locally.
    #[must_use]
    pub fn local_only() -> Self {
        Self::new(TelemetryConfig::default())
    }

    /// Check if events are forwarded to HEC.
    #[must_use]
    pub fn forwards(&self) -> bool {
        self.http.is_some()
    }

    /// Application version attached to search events.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.config.app_version
    }

    /// Emit an event.
    ///
    /// Must be called from within a Tokio runtime when forwarding is enabled.
    pub fn emit<E: Serialize>(&self, event: &E) {
        let value = match serde_json::to_value(event) {
            Ok(value) => value,
            Err(e) => {
                debug!("Dropping unserializable telemetry event: {e}");
                return;
            }
        };
        info!(target: EVENT_TARGET, event = %value);

        let (Some(http), Some(url), Some(token)) = (
            self.http.clone(),
            self.config.hec_url.clone(),
            self.config.hec_token.clone(),
        ) else {
            return;
        };
        let payload = self.hec_payload(value);
        tokio::spawn(async move {
            let result = http
                .post(&url)
                .header("Authorization", format!("Splunk {token}"))
                .json(&payload)
                .send()
                .await;
            match result {
                Ok(resp) if !resp.status().is_success() => {
                    debug!("HEC rejected event: {}", resp.status());
                }
                Ok(_) => {}
                Err(e) => debug!("HEC forwarding failed: {e}"),
            }
        });
    }

    /// Wrap an event in the HEC envelope.
    #[must_use]
    pub fn hec_payload(&self, event: Value) -> Value {
        #[allow(clippy::cast_precision_loss)]
        let time = Utc::now().timestamp_millis() as f64 / 1000.0;
        let mut payload = json!({
            "event": event,
            "sourcetype": self.config.sourcetype,
            "source": self.config.source,
            "time": time,
        });
        if let Some(index) = &self.config.index {
            payload["index"] = Value::String(index.clone());
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_event_shape() {
        let query = Query::normalize("dal123", "");
        let event = SearchEvent::ok(&query, 2, 3, "demo-0.1");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "aircraft_search");
        assert_eq!(json["query_type"], "callsign");
        assert_eq!(json["callsign"], "dal123");
        assert!(json["tail"].is_null());
        assert_eq!(json["rowcount"], 2);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["app_version"], "demo-0.1");
    }

    #[test]
    fn test_error_event_shape() {
        let err = crate::Error::DatasetTimeout { timeout_ms: 10 };
        let event = ErrorEvent::new("/aircraft", &Query::all(), 25, 11, &err);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "error");
        assert_eq!(json["route"], "/aircraft");
        assert_eq!(json["query_type"], "none");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error_type"], "dataset_timeout");
        assert_eq!(json["limit"], 25);
    }

    #[test]
    fn test_local_only_does_not_forward() {
        let telemetry = Telemetry::local_only();
        assert!(!telemetry.forwards());
        telemetry.emit(&json!({"event": "meta", "rows": 3, "status": "ok"}));
    }

    #[test]
    fn test_hec_payload_envelope() {
        let telemetry = Telemetry::new(TelemetryConfig {
            index: Some("main".to_string()),
            ..TelemetryConfig::default()
        });
        let payload = telemetry.hec_payload(json!({"event": "meta"}));

        assert_eq!(payload["event"]["event"], "meta");
        assert_eq!(payload["sourcetype"], "adsb_api");
        assert_eq!(payload["source"], "adsb-lookup");
        assert_eq!(payload["index"], "main");
        assert!(payload["time"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_hec_payload_without_index() {
        let payload = Telemetry::local_only().hec_payload(json!({}));
        assert!(payload.get("index").is_none());
    }

    #[test]
    fn test_forwarding_with_tls_verification_disabled() {
        let telemetry = Telemetry::new(TelemetryConfig {
            hec_url: Some("https://splunk.local:8088/services/collector".to_string()),
            hec_token: Some("token".to_string()),
            verify_tls: false,
            ..TelemetryConfig::default()
        });
        assert!(telemetry.forwards());
    }

    #[tokio::test]
    async fn test_forwarding_failure_is_swallowed() {
        let telemetry = Telemetry::new(TelemetryConfig {
            hec_url: Some("http://127.0.0.1:9/services/collector".to_string()),
            hec_token: Some("token".to_string()),
            timeout_ms: 100,
            ..TelemetryConfig::default()
        });
        assert!(telemetry.forwards());
        telemetry.emit(&json!({"event": "meta"}));
        tokio::time::sleep(std::time::Duration::from_millis(150)).await;
    }
}

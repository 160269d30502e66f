use std::time::Instant;

use axum::extract::{Query as QueryParams, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::{ApiError, AppState};
use crate::query::Query;
use crate::telemetry::{ErrorEvent, SearchEvent};

/// Raw `/aircraft` parameters. Empty strings mean "unset".
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchParams {
    callsign: Option<String>,
    tail: Option<String>,
    limit: Option<String>,
}

impl SearchParams {
    fn query(&self) -> Query {
        Query::from_optional(self.callsign.as_deref(), self.tail.as_deref())
    }

    fn limit(&self) -> Result<Option<usize>, ApiError> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse::<usize>().map(Some).map_err(|_| {
                ApiError::bad_request(format!(
                    "limit must be a non-negative integer, got {raw:?}"
                ))
            }),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

pub(crate) async fn meta_handler(State(state): State<AppState>) -> Response {
    match state.provider.snapshot().await {
        Ok(dataset) => {
            state.telemetry.emit(&json!({
                "event": "meta",
                "rows": dataset.len(),
                "status": "ok",
            }));
            Json(json!({
                "rows": dataset.len(),
                "data_last_updated": dataset.loaded_at().to_rfc3339(),
                "fingerprint": dataset.fingerprint(),
                "source": dataset.source(),
            }))
            .into_response()
        }
        Err(err) => {
            error!(route = "/meta", "dataset unavailable: {err}");
            ApiError::from(&err).into_response()
        }
    }
}

pub(crate) async fn aircraft_handler(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Response {
    let started = Instant::now();
    let query = params.query();
    let limit = match params.limit() {
        Ok(requested) => state.effective_limit(requested),
        Err(api_err) => return api_err.into_response(),
    };

    let dataset = match state.provider.snapshot().await {
        Ok(dataset) => dataset,
        Err(err) => {
            error!(route = "/aircraft", "dataset unavailable: {err}");
            state.telemetry.emit(&ErrorEvent::new(
                "/aircraft",
                &query,
                limit,
                elapsed_ms(started),
                &err,
            ));
            return ApiError::from(&err).into_response();
        }
    };

    let matches = dataset.search(&query);
    let page: Vec<_> = matches.into_iter().take(limit).collect();

    info!(
        query_type = %query.kind(),
        rowcount = page.len(),
        limit,
        "aircraft search"
    );
    state.telemetry.emit(&SearchEvent::ok(
        &query,
        page.len(),
        elapsed_ms(started),
        state.telemetry.app_version(),
    ));
    Json(page).into_response()
}

pub(crate) async fn detail_handler(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Response {
    let query = params.query();
    match state.provider.snapshot().await {
        Ok(dataset) => {
            let detail = dataset.detail(&query);
            if detail.is_ambiguous() {
                info!(
                    matches = detail.matches,
                    "detail lookup is ambiguous; returning first match"
                );
            }
            Json(detail).into_response()
        }
        Err(err) => {
            error!(route = "/aircraft/detail", "dataset unavailable: {err}");
            ApiError::from(&err).into_response()
        }
    }
}

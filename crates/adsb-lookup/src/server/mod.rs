//! HTTP surface of the lookup service.
//!
//! Routes:
//!
//! | route               | purpose |
//! |---------------------|---------|
//! | `GET /healthz`      | liveness |
//! | `GET /meta`         | row count, load time and fingerprint of the dataset |
//! | `GET /aircraft`     | search by `callsign` and/or `tail`, bounded by `limit` |
//! | `GET /aircraft/detail` | first match plus cardinality |
//!
//! Dataset failures answer `503`; zero matches is a `200` with an empty list.

mod error;
mod handlers;
mod middleware;

use std::net::SocketAddr;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::dataset::DatasetProvider;
use crate::error::Result;
use crate::telemetry::Telemetry;

pub use error::ApiError;

/// Shared state for request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    provider: Arc<DatasetProvider>,
    telemetry: Telemetry,
    limits: ServerConfig,
    cors_allow_any_origin: bool,
    request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    /// Create handler state.
    #[must_use]
    pub fn new(provider: DatasetProvider, telemetry: Telemetry, server: &ServerConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            telemetry,
            limits: server.clone(),
            cors_allow_any_origin: server.cors_allow_any_origin,
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Clamp a requested limit, see [`ServerConfig::effective_limit`].
    #[must_use]
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        self.limits.effective_limit(requested)
    }
}

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz_handler))
        .route("/meta", get(handlers::meta_handler))
        .route("/aircraft", get(handlers::aircraft_handler))
        .route("/aircraft/detail", get(handlers::detail_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::cors_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_tracing_middleware,
        ))
        .with_state(state)
}

/// Serve the API on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("adsb-lookup listening on {}", listener.local_addr()?);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("adsb-lookup stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::source::CsvSource;

    fn state_with(server: &ServerConfig) -> AppState {
        let dataset = Dataset::new(Vec::new(), "mem");
        let provider = DatasetProvider::from_dataset(dataset, Arc::new(CsvSource::new("mem.csv")));
        AppState::new(provider, Telemetry::local_only(), server)
    }

    #[test]
    fn test_effective_limit() {
        let state = state_with(&ServerConfig::default());

        assert_eq!(state.effective_limit(None), 25);
        assert_eq!(state.effective_limit(Some(0)), 1);
        assert_eq!(state.effective_limit(Some(10)), 10);
        assert_eq!(state.effective_limit(Some(10_000)), 500);
    }

    #[test]
    fn test_build_router() {
        let state = state_with(&ServerConfig::default());
        let _router = build_router(state);
    }
}

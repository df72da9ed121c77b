//! HTTP API — thin Axum layer over the round engine.
//!
//! Exposes the round state and bet gate as JSON. CORS is open so the
//! web client can be served from a different origin during development.

pub mod routes;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::types::GameError;
use routes::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/rounds/state", get(routes::get_state))
        .route("/api/rounds/bet", post(routes::place_bet))
        .route("/api/rounds/:id/seed", get(routes::get_seed))
        .route("/api/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `addr` until `shutdown` resolves.
pub async fn serve<F>(state: AppState, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| GameError::Bind { addr, source })?;

    info!(%addr, "Round API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

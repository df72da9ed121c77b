//! Round API route handlers.
//!
//! All endpoints return JSON. The engine is shared via `Arc<RoundEngine>`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::engine::RoundEngine;
use crate::types::{BetAck, Outcome, RoundStatus, RoundView, SeedDisclosure};

pub type AppState = Arc<RoundEngine>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StateResponse {
    pub id: u64,
    pub status: RoundStatus,
    pub timeleft: u64,
    pub outcome: Option<Outcome>,
    pub duration: u64,
}

impl From<RoundView> for StateResponse {
    fn from(view: RoundView) -> Self {
        Self {
            id: view.id,
            status: view.status,
            timeleft: view.seconds_remaining,
            outcome: view.outcome,
            duration: view.duration,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BetResponse {
    pub ok: bool,
    pub round_id: u64,
    pub status: RoundStatus,
}

impl From<BetAck> for BetResponse {
    fn from(ack: BetAck) -> Self {
        Self {
            ok: ack.accepted,
            round_id: ack.round_id,
            status: ack.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedResponse {
    pub round_id: u64,
    pub commitment: String,
    pub seed: Option<String>,
}

impl From<SeedDisclosure> for SeedResponse {
    fn from(disclosure: SeedDisclosure) -> Self {
        Self {
            round_id: disclosure.round_id,
            commitment: disclosure.commitment,
            seed: disclosure.seed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/rounds/state
pub async fn get_state(State(engine): State<AppState>) -> Json<StateResponse> {
    Json(engine.get_state().into())
}

/// POST /api/rounds/bet
///
/// Gatekeeping only: the request body (stake, direction) is forwarded to
/// the ledger by the caller, not read here.
pub async fn place_bet(State(engine): State<AppState>) -> Json<BetResponse> {
    Json(engine.place_bet().into())
}

/// GET /api/rounds/:id/seed
pub async fn get_seed(
    State(engine): State<AppState>,
    Path(round_id): Path<u64>,
) -> Result<Json<SeedResponse>, StatusCode> {
    engine
        .reveal_seed(round_id)
        .map(|disclosure| Json(disclosure.into()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

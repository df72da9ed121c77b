//! Shared types for the UPDOWN round engine.
//!
//! `Round` is the sole entity. Its fields are private so that the
//! once-only assignments (outcome, reveal time) can only happen through
//! the engine's transition methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fairness::RoundSeed;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Result of a round: which way the market went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Up,
    Down,
}

impl Outcome {
    /// Map a single random bit to an outcome.
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Outcome::Up
        } else {
            Outcome::Down
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Up => write!(f, "up"),
            Outcome::Down => write!(f, "down"),
        }
    }
}

/// Lifecycle status. Progresses strictly `Betting → Closed → Settled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Betting,
    Closed,
    Settled,
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundStatus::Betting => write!(f, "betting"),
            RoundStatus::Closed => write!(f, "closed"),
            RoundStatus::Settled => write!(f, "settled"),
        }
    }
}

// ---------------------------------------------------------------------------
// Round
// ---------------------------------------------------------------------------

/// One complete betting cycle from open to settlement.
#[derive(Debug, Clone)]
pub struct Round {
    id: u64,
    started_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    reveal_at: Option<DateTime<Utc>>,
    status: RoundStatus,
    outcome: Option<Outcome>,
    seed: RoundSeed,
}

impl Round {
    /// Open a new round in `Betting` at `now`.
    pub(crate) fn open(id: u64, now: DateTime<Utc>, duration: chrono::Duration, seed: RoundSeed) -> Self {
        Self {
            id,
            started_at: now,
            ends_at: now + duration,
            reveal_at: None,
            status: RoundStatus::Betting,
            outcome: None,
            seed,
        }
    }

    /// `Betting → Closed`. No-op unless currently betting.
    pub(crate) fn close(&mut self, outcome: Outcome, reveal_at: DateTime<Utc>) -> bool {
        if self.status != RoundStatus::Betting {
            return false;
        }
        self.status = RoundStatus::Closed;
        self.outcome = Some(outcome);
        self.reveal_at = Some(reveal_at);
        true
    }

    /// `Closed → Settled`. No-op unless currently closed.
    pub(crate) fn settle(&mut self) -> bool {
        if self.status != RoundStatus::Closed {
            return false;
        }
        self.status = RoundStatus::Settled;
        true
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }

    pub fn reveal_at(&self) -> Option<DateTime<Utc>> {
        self.reveal_at
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn seed(&self) -> &RoundSeed {
        &self.seed
    }

    pub fn is_betting(&self) -> bool {
        self.status == RoundStatus::Betting
    }

    pub fn is_settled(&self) -> bool {
        self.status == RoundStatus::Settled
    }

    /// Whole seconds left in the betting window, truncated. Zero once
    /// the round has left `Betting`.
    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> u64 {
        if !self.is_betting() {
            return 0;
        }
        (self.ends_at - now).num_seconds().max(0) as u64
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Round #{} [{}]", self.id, self.status)?;
        if let Some(outcome) = self.outcome {
            write!(f, " outcome={outcome}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Views returned to collaborators
// ---------------------------------------------------------------------------

/// Read-only snapshot returned by `RoundEngine::get_state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundView {
    pub id: u64,
    pub status: RoundStatus,
    pub seconds_remaining: u64,
    pub outcome: Option<Outcome>,
    /// Configured betting window in seconds.
    pub duration: u64,
}

/// Gatekeeping answer returned by `RoundEngine::place_bet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetAck {
    pub accepted: bool,
    pub round_id: u64,
    pub status: RoundStatus,
}

/// Fairness material for a round. `seed` stays `None` until settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedDisclosure {
    pub round_id: u64,
    pub commitment: String,
    pub seed: Option<String>,
}

/// Emitted exactly once per round at `Closed → Settled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub round_id: u64,
    pub outcome: Outcome,
    pub settled_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for UPDOWN.
///
/// The round engine itself never fails; these cover the ambient
/// surfaces around it.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

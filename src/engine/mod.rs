//! Round engine — the time-driven betting state machine.
//!
//! The engine advances lazily: nothing happens between calls, and each
//! call to a public operation first brings the current round up to date
//! with the wall clock. Each call performs at most one transition
//! (`Betting → Closed`, `Closed → Settled`, or superseding a settled round
//! with a fresh one). No state is ever skipped, so a caller returning after
//! a long gap walks the round forward one step per call.
//!
//! The current round and the round counter sit behind a single mutex.
//! Reading the clock, checking the deadline and applying the transition all
//! happen under that lock, so concurrent callers observing the same expired
//! deadline produce exactly one outcome draw and one reveal time.

pub mod settlement;

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::RoundConfig;
use crate::fairness::{OsRandom, RandomSource};
use crate::types::{BetAck, GameError, Round, RoundStatus, RoundView, SeedDisclosure, Settlement};
use settlement::{NoopListener, SettlementListener};

#[derive(Debug, Default)]
struct EngineState {
    current: Option<Round>,
    /// Id handed to the most recently created round.
    counter: u64,
    /// Fairness material of the last round to settle, kept after it is
    /// superseded so its seed stays verifiable.
    last_settled: Option<SeedDisclosure>,
}

/// Owns the current round. Construct once and share via `Arc`.
pub struct RoundEngine {
    config: RoundConfig,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    listener: Arc<dyn SettlementListener>,
    state: Mutex<EngineState>,
}

impl RoundEngine {
    /// Engine on the system clock and OS randomness, with no settlement
    /// listener. Rejects round lengths the timestamp arithmetic cannot
    /// represent, so the public operations never fail afterwards.
    pub fn new(config: RoundConfig) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            clock: Arc::new(SystemClock),
            random: Arc::new(OsRandom),
            listener: Arc::new(NoopListener),
            state: Mutex::new(EngineState::default()),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn with_settlement_listener(mut self, listener: Arc<dyn SettlementListener>) -> Self {
        self.listener = listener;
        self
    }

    // -- Public operations ------------------------------------------------

    /// Current round as seen now. Creates a round if none is live.
    pub fn get_state(&self) -> RoundView {
        let mut state = self.lock();
        let now = self.clock.now();
        let round = self.ensure_current(&mut state, now);

        RoundView {
            id: round.id(),
            status: round.status(),
            seconds_remaining: round.seconds_remaining(now),
            outcome: round.outcome(),
            duration: self.config.duration_secs,
        }
    }

    /// Whether a bet would be accepted right now. Records nothing; stake,
    /// direction and user belong to the ledger that consumes the answer.
    pub fn place_bet(&self) -> BetAck {
        let mut state = self.lock();
        let now = self.clock.now();
        let round = self.ensure_current(&mut state, now);

        let ack = BetAck {
            accepted: round.is_betting(),
            round_id: round.id(),
            status: round.status(),
        };
        debug!(round_id = ack.round_id, status = %ack.status, accepted = ack.accepted, "Bet gate evaluated");
        ack
    }

    /// Commitment for `round_id`, with the seed attached once that round
    /// has settled. Only the current round and the last settled round are
    /// known; anything else returns `None`.
    pub fn reveal_seed(&self, round_id: u64) -> Option<SeedDisclosure> {
        let mut state = self.lock();
        let now = self.clock.now();
        let round = self.ensure_current(&mut state, now);

        if round.id() == round_id {
            return Some(SeedDisclosure {
                round_id,
                commitment: round.seed().commitment(),
                seed: round.is_settled().then(|| round.seed().to_hex()),
            });
        }

        state
            .last_settled
            .as_ref()
            .filter(|disclosure| disclosure.round_id == round_id)
            .cloned()
    }

    /// Copy of the current round without advancing it.
    pub fn snapshot(&self) -> Option<Round> {
        self.lock().current.clone()
    }

    // -- Internals --------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        // Every mutation leaves the state consistent, so a panic elsewhere
        // while holding the lock cannot leave a half-applied transition.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Bring the current round up to date with `now`. Must be called with
    /// the engine lock held (enforced by taking `&mut EngineState`).
    fn ensure_current<'s>(&self, state: &'s mut EngineState, now: DateTime<Utc>) -> &'s Round {
        if state.current.as_ref().is_some_and(Round::is_settled) {
            if let Some(settled) = state.current.take() {
                debug!(round_id = settled.id(), "Superseding settled round");
            }
        }

        let EngineState { current, counter, last_settled } = state;
        let mut created = false;
        let round = current.get_or_insert_with(|| {
            created = true;
            *counter += 1;
            self.open_round(*counter, now)
        });

        if !created {
            if let Some(disclosure) = self.advance(round, now) {
                *last_settled = Some(disclosure);
            }
        }
        round
    }

    fn open_round(&self, id: u64, now: DateTime<Utc>) -> Round {
        let round = Round::open(id, now, self.config.duration(), self.random.generate_seed());
        info!(
            round_id = id,
            ends_at = %round.ends_at(),
            commitment = %round.seed().commitment(),
            "Round opened for betting"
        );
        round
    }

    /// Apply at most one time-driven transition. Returns the round's
    /// fairness disclosure if it settled.
    fn advance(&self, round: &mut Round, now: DateTime<Utc>) -> Option<SeedDisclosure> {
        match round.status() {
            RoundStatus::Betting if now >= round.ends_at() => {
                let outcome = self.random.draw_outcome();
                let reveal_at = now + self.config.reveal_delay();
                if round.close(outcome, reveal_at) {
                    info!(round_id = round.id(), %outcome, %reveal_at, "Round closed");
                }
                None
            }
            RoundStatus::Closed => {
                let reveal_at = round.reveal_at()?;
                let outcome = round.outcome()?;
                if now < reveal_at || !round.settle() {
                    return None;
                }
                info!(round_id = round.id(), %outcome, "Round settled");
                self.listener.on_settled(&Settlement {
                    round_id: round.id(),
                    outcome,
                    settled_at: now,
                });
                Some(SeedDisclosure {
                    round_id: round.id(),
                    commitment: round.seed().commitment(),
                    seed: Some(round.seed().to_hex()),
                })
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

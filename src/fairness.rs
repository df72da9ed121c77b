//! Randomness and commit-reveal groundwork.
//!
//! Every round carries a 128-bit seed drawn from the OS CSPRNG at creation.
//! The BLAKE3 digest of the seed is the public commitment; the seed itself
//! is only disclosed after the round settles so anyone can check it against
//! the commitment published while betting was open.
//!
//! Outcomes are an independent draw from the same source. Deriving the
//! outcome from the seed is not implemented yet.

use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use std::fmt;

use crate::types::Outcome;

/// Seed size in bytes (128 bits of entropy).
pub const SEED_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// Per-round fairness seed.
#[derive(Clone, PartialEq, Eq)]
pub struct RoundSeed([u8; SEED_LEN]);

impl RoundSeed {
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    /// Lowercase hex encoding of the raw seed. Only disclose after settlement.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Hex-encoded BLAKE3 digest of the seed, safe to publish at any time.
    pub fn commitment(&self) -> String {
        blake3::hash(&self.0).to_hex().to_string()
    }
}

impl fmt::Debug for RoundSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoundSeed(commitment={})", self.commitment())
    }
}

/// Check a revealed hex seed against a published commitment.
///
/// Returns `false` for malformed hex rather than erroring: a seed that
/// cannot be decoded cannot match.
pub fn verify_commitment(seed_hex: &str, commitment_hex: &str) -> bool {
    let Ok(seed) = hex::decode(seed_hex) else {
        return false;
    };
    if seed.len() != SEED_LEN {
        return false;
    }
    blake3::hash(&seed)
        .to_hex()
        .as_str()
        .eq_ignore_ascii_case(commitment_hex)
}

// ---------------------------------------------------------------------------
// Random source
// ---------------------------------------------------------------------------

/// Source of round randomness.
///
/// Called from inside the engine's critical section, so implementations
/// must be thread-safe and must not block.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send + Sync {
    /// Draw a uniformly distributed outcome.
    fn draw_outcome(&self) -> Outcome;

    /// Generate a fresh round seed.
    fn generate_seed(&self) -> RoundSeed;
}

/// Production source backed by the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn draw_outcome(&self) -> Outcome {
        let mut rng = OsRng;
        Outcome::from_bit(rng.gen::<bool>())
    }

    fn generate_seed(&self) -> RoundSeed {
        let mut bytes = [0u8; SEED_LEN];
        OsRng.fill_bytes(&mut bytes);
        RoundSeed::from_bytes(bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

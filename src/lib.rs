//! UPDOWN — server-authoritative round engine for a timed up/down game.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod clock;
pub mod fairness;
pub mod engine;
pub mod api;

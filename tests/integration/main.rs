//! Integration tests for the round engine.

mod concurrency;
mod http;

//! Settlement notification.
//!
//! Payouts are computed elsewhere. The engine only announces, exactly once
//! per round, that a round has reached `Settled` and with which outcome.

use tokio::sync::mpsc;
use tracing::warn;

use crate::types::Settlement;

/// Observer of `Closed → Settled` transitions.
///
/// Invoked while the engine lock is held: implementations must return
/// immediately and must not call back into the engine.
pub trait SettlementListener: Send + Sync {
    fn on_settled(&self, settlement: &Settlement);
}

/// Discards settlements.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl SettlementListener for NoopListener {
    fn on_settled(&self, _settlement: &Settlement) {}
}

/// Forwards settlements over an unbounded tokio channel so an async
/// consumer can process them outside the engine lock.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<Settlement>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Settlement>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SettlementListener for ChannelListener {
    fn on_settled(&self, settlement: &Settlement) {
        if self.tx.send(settlement.clone()).is_err() {
            warn!(round_id = settlement.round_id, "Settlement consumer gone, dropping notification");
        }
    }
}

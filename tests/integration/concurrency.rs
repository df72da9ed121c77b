//! Concurrent callers racing on the same expired deadline.

use chrono::Duration;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use updown::types::{Outcome, RoundStatus};

use crate::mock_random::{CountingRandom, Harness};

const CALLERS: usize = 64;

#[test]
fn test_concurrent_close_draws_once() {
    let h = Harness::new(CountingRandom::alternating());
    h.engine.get_state();
    h.at(Duration::seconds(30));

    let barrier = Arc::new(Barrier::new(CALLERS));
    let handles: Vec<_> = (0..CALLERS)
        .map(|i| {
            let engine = h.engine.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    let s = engine.get_state();
                    (s.id, s.status, s.outcome)
                } else {
                    let ack = engine.place_bet();
                    (ack.round_id, ack.status, None)
                }
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

    assert_eq!(h.random.draws(), 1);
    assert_eq!(h.random.seeds(), 1);
    assert!(results.iter().all(|(id, status, _)| *id == 1 && *status == RoundStatus::Closed));

    let outcomes: HashSet<Outcome> = results.iter().filter_map(|(_, _, o)| *o).collect();
    assert_eq!(outcomes.len(), 1);

    let round = h.engine.snapshot().unwrap();
    assert_eq!(round.reveal_at(), Some(h.now() + Duration::seconds(5)));
}

#[test]
fn test_concurrent_supersession_creates_one_round() {
    let h = Harness::new(CountingRandom::fixed(Outcome::Down));
    h.engine.get_state();
    h.at(Duration::seconds(30));
    h.engine.get_state();
    h.at(Duration::seconds(35));
    assert_eq!(h.engine.get_state().status, RoundStatus::Settled);

    let barrier = Arc::new(Barrier::new(CALLERS));
    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let engine = h.engine.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                engine.place_bet()
            })
        })
        .collect();

    let acks: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
    assert!(acks.iter().all(|ack| ack.accepted && ack.round_id == 2));
    assert_eq!(h.random.seeds(), 2);
    assert_eq!(h.listener.settlements().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_settle_once() {
    let h = Harness::new(CountingRandom::fixed(Outcome::Up));
    h.engine.get_state();
    h.at(Duration::seconds(30));
    h.engine.get_state();
    h.at(Duration::seconds(40));

    let tasks = (0..CALLERS).map(|_| {
        let engine = h.engine.clone();
        tokio::spawn(async move { engine.get_state() })
    });
    let views: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    // Exactly one caller settles; everyone after it sees the next round.
    let settled = views.iter().filter(|v| v.status == RoundStatus::Settled).count();
    assert_eq!(settled, 1);
    assert!(views
        .iter()
        .filter(|v| v.status != RoundStatus::Settled)
        .all(|v| v.id == 2 && v.status == RoundStatus::Betting));
    assert_eq!(h.listener.settlements().len(), 1);
    assert_eq!(h.random.draws(), 1);
}

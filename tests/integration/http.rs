//! Round API exercised over the Axum router.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::Duration;
use tower::ServiceExt;

use updown::api::build_router;
use updown::fairness::verify_commitment;
use updown::types::Outcome;

use crate::mock_random::{CountingRandom, Harness};

async fn call(h: &Harness, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = build_router(h.engine.clone())
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_round_cycle_over_http() {
    let h = Harness::new(CountingRandom::fixed(Outcome::Down));

    let (status, state) = call(&h, Method::GET, "/api/rounds/state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["id"], 1);
    assert_eq!(state["status"], "betting");
    assert_eq!(state["timeleft"], 30);

    h.at(Duration::seconds(10));
    let (_, bet) = call(&h, Method::POST, "/api/rounds/bet").await;
    assert_eq!(bet["ok"], true);
    assert_eq!(bet["round_id"], 1);

    h.at(Duration::seconds(31));
    let (_, state) = call(&h, Method::GET, "/api/rounds/state").await;
    assert_eq!(state["status"], "closed");
    assert_eq!(state["outcome"], "down");
    assert_eq!(state["timeleft"], 0);

    let (_, bet) = call(&h, Method::POST, "/api/rounds/bet").await;
    assert_eq!(bet["ok"], false);
    assert_eq!(bet["status"], "closed");

    h.at(Duration::seconds(36));
    let (_, state) = call(&h, Method::GET, "/api/rounds/state").await;
    assert_eq!(state["status"], "settled");

    let (_, state) = call(&h, Method::GET, "/api/rounds/state").await;
    assert_eq!(state["id"], 2);
    assert_eq!(state["status"], "betting");
    assert!(state["outcome"].is_null());
}

#[tokio::test]
async fn test_seed_endpoint_reveals_after_settlement() {
    let h = Harness::new(CountingRandom::fixed(Outcome::Up));

    let (status, committed) = call(&h, Method::GET, "/api/rounds/1/seed").await;
    assert_eq!(status, StatusCode::OK);
    assert!(committed["seed"].is_null());
    let commitment = committed["commitment"].as_str().unwrap().to_string();

    h.at(Duration::seconds(30));
    call(&h, Method::GET, "/api/rounds/state").await;
    h.at(Duration::seconds(35));
    call(&h, Method::GET, "/api/rounds/state").await;
    call(&h, Method::GET, "/api/rounds/state").await;

    let (status, revealed) = call(&h, Method::GET, "/api/rounds/1/seed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revealed["commitment"], commitment.as_str());
    assert!(verify_commitment(revealed["seed"].as_str().unwrap(), &commitment));

    let (status, _) = call(&h, Method::GET, "/api/rounds/7/seed").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

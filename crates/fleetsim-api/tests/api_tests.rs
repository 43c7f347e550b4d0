//! Integration tests for the simulation control endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, backed by the in-memory gateway.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use fleetsim_api::build_router;
use fleetsim_api::state::AppState;
use fleetsim_core::{InMemoryGateway, SimulationConfig, SimulationRegistry};
use fleetsim_types::{GeoPoint, RouteId, RouteStatus, VesselId, VesselStatus, Waypoint};
use serde_json::Value;
use tower::ServiceExt;

struct Harness {
    router: Router,
    gateway: Arc<InMemoryGateway>,
    registry: Arc<SimulationRegistry<InMemoryGateway>>,
}

fn route(points: &[(f64, f64)]) -> Vec<Waypoint> {
    points
        .iter()
        .zip(1_u32..)
        .map(|(&(lat, lng), seq)| Waypoint::new(seq, lat, lng))
        .collect()
}

async fn make_harness() -> Harness {
    let gateway = Arc::new(InMemoryGateway::new());
    gateway
        .add_vessel(VesselId(1), "Aurora", VesselStatus::Active, Some(GeoPoint::new(0.0, 0.0)))
        .await;
    gateway
        .add_vessel(VesselId(2), "Borealis", VesselStatus::Docked, None)
        .await;
    gateway
        .add_vessel(VesselId(3), "Corsair", VesselStatus::Maintenance, None)
        .await;
    gateway
        .add_route(
            RouteId(10),
            Some(VesselId(1)),
            RouteStatus::Active,
            route(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]),
        )
        .await;

    let config = SimulationConfig {
        tick_interval_ms: 1000,
        seed: Some(1),
        ..SimulationConfig::default()
    };
    let registry = Arc::new(SimulationRegistry::new(Arc::clone(&gateway), config));
    let state = Arc::new(AppState::new(Arc::clone(&registry)));

    Harness {
        router: build_router(state),
        gateway,
        registry,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_health() {
    let h = make_harness().await;
    let response = send(&h.router, "GET", "/health", "").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["activeSimulations"], 0);
}

#[tokio::test(start_paused = true)]
async fn test_start_then_status() {
    let h = make_harness().await;

    let response = send(&h.router, "POST", "/api/simulation/start/1", r#"{"speed": 12}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["simulation"]["vesselName"], "Aurora");
    assert_eq!(json["simulation"]["waypointCount"], 3);
    assert_eq!(json["simulation"]["startingIndex"], 0);
    assert_eq!(json["simulation"]["intervalMs"], 1000);

    let response = send(&h.router, "GET", "/api/simulation/status/1", "").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["running"], true);
    assert_eq!(json["vesselId"], 1);
    assert_eq!(json["totalWaypoints"], 3);
    assert_eq!(json["speed"], 12.0);

    let response = send(&h.router, "GET", "/api/simulation/status", "").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["activeCount"], 1);
    assert_eq!(json["simulations"][0]["vesselName"], "Aurora");

    h.registry.stop_all().await;
}

#[tokio::test(start_paused = true)]
async fn test_start_without_body_uses_defaults() {
    let h = make_harness().await;
    let response = send(&h.router, "POST", "/api/simulation/start/1", "").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["simulation"]["speedKnots"], 8.0);
    h.registry.stop_all().await;
}

#[tokio::test(start_paused = true)]
async fn test_second_start_is_rejected() {
    let h = make_harness().await;
    send(&h.router, "POST", "/api/simulation/start/1", "").await;

    let response = send(&h.router, "POST", "/api/simulation/start/1", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["reason"], "already_running");
    assert_eq!(json["message"], "Simulation already running for this vessel");
    h.registry.stop_all().await;
}

#[tokio::test(start_paused = true)]
async fn test_start_rejections_carry_reason() {
    let h = make_harness().await;

    let response = send(&h.router, "POST", "/api/simulation/start/3", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["reason"], "invalid_vessel_state");
    assert_eq!(json["status"], "Maintenance");

    let response = send(&h.router, "POST", "/api/simulation/start/99", "").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["reason"], "vessel_not_found");

    let response = send(
        &h.router,
        "POST",
        "/api/simulation/start/1",
        r#"{"intervalMs": 10}"#,
    )
    .await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["reason"], "invalid_options");
    assert!(!h.registry.is_running(VesselId(1)).await);
}

#[tokio::test(start_paused = true)]
async fn test_bad_input_is_bad_request() {
    let h = make_harness().await;

    let response = send(&h.router, "POST", "/api/simulation/start/abc", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], false);

    let response = send(&h.router, "POST", "/api/simulation/start/1", "{not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&h.router, "GET", "/api/simulation/status/x1", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_stop_and_stop_again() {
    let h = make_harness().await;
    send(&h.router, "POST", "/api/simulation/start/1", "").await;

    let response = send(&h.router, "POST", "/api/simulation/stop/1", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], true);

    let response = send(&h.router, "GET", "/api/simulation/status/1", "").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, serde_json::json!({ "running": false }));

    let response = send(&h.router, "POST", "/api/simulation/stop/1", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["reason"], "not_running");
}

#[tokio::test(start_paused = true)]
async fn test_start_all_and_stop_all() {
    let h = make_harness().await;

    let response = send(&h.router, "POST", "/api/simulation/start-all", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["started"], 1);
    assert_eq!(json["results"][0]["vesselId"], 1);
    assert_eq!(json["results"][0]["success"], true);

    let response = send(&h.router, "POST", "/api/simulation/stop-all", "").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["stopped"], 1);
    assert!(h.registry.status_all().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reactivate() {
    let h = make_harness().await;

    let response = send(&h.router, "POST", "/api/simulation/reactivate/2", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        h.gateway.vessel_status(VesselId(2)).await,
        Some(VesselStatus::Active)
    );

    let response = send(&h.router, "POST", "/api/simulation/reactivate/2", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["reason"], "not_docked");
    assert_eq!(json["status"], "Active");
}

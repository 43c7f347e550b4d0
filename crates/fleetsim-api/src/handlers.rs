//! REST endpoint handlers for simulation control.
//!
//! Every handler is a thin pass-through to the [`SimulationRegistry`]
//! held in [`AppState`]. Command responses carry `success` and a
//! human-readable `message`; refusals are rendered by [`ApiError`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness and active simulation count |
//! | `GET` | `/api/simulation/status` | Status of every running simulation |
//! | `GET` | `/api/simulation/status/{vessel_id}` | Status of one vessel |
//! | `POST` | `/api/simulation/start/{vessel_id}` | Start one vessel |
//! | `POST` | `/api/simulation/start-all` | Start every eligible vessel |
//! | `POST` | `/api/simulation/stop/{vessel_id}` | Stop one vessel |
//! | `POST` | `/api/simulation/stop-all` | Stop everything |
//! | `POST` | `/api/simulation/reactivate/{vessel_id}` | Docked back to Active |
//!
//! [`SimulationRegistry`]: fleetsim_core::SimulationRegistry

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use fleetsim_core::VesselGateway;
use fleetsim_types::{StartOptions, VesselId};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness check.
pub async fn health<G: VesselGateway>(State(state): State<Arc<AppState<G>>>) -> impl IntoResponse {
    let active = state.registry.status_all().await.len();
    Json(serde_json::json!({
        "status": "ok",
        "activeSimulations": active,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/simulation/status
// ---------------------------------------------------------------------------

/// Status of every registered simulation, ordered by vessel id.
pub async fn status_all<G: VesselGateway>(
    State(state): State<Arc<AppState<G>>>,
) -> impl IntoResponse {
    let simulations = state.registry.status_all().await;
    Json(serde_json::json!({
        "activeCount": simulations.len(),
        "simulations": simulations,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/simulation/status/{vessel_id}
// ---------------------------------------------------------------------------

/// Status of one vessel's simulation. Vessels that are not simulating
/// report `{"running": false}`.
pub async fn status<G: VesselGateway>(
    State(state): State<Arc<AppState<G>>>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let vessel_id = parse_vessel_id(&raw_id)?;
    Ok(Json(state.registry.status(vessel_id).await))
}

// ---------------------------------------------------------------------------
// POST /api/simulation/start/{vessel_id}
// ---------------------------------------------------------------------------

/// Start simulating one vessel.
///
/// The body is optional; `{"speed": 12, "intervalMs": 1000}` overrides the
/// configured defaults.
pub async fn start<G: VesselGateway>(
    State(state): State<Arc<AppState<G>>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let vessel_id = parse_vessel_id(&raw_id)?;
    let options = parse_options(&body)?;
    let report = state.registry.start(vessel_id, options).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Simulation started for vessel {}", report.vessel_name),
        "simulation": report,
    })))
}

// ---------------------------------------------------------------------------
// POST /api/simulation/start-all
// ---------------------------------------------------------------------------

/// Start every active vessel that has an active route.
pub async fn start_all<G: VesselGateway>(
    State(state): State<Arc<AppState<G>>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let options = parse_options(&body)?;
    let report = state.registry.start_all(options).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!(
            "Started {} of {} vessel simulations",
            report.started,
            report.results.len()
        ),
        "started": report.started,
        "results": report.results,
    })))
}

// ---------------------------------------------------------------------------
// POST /api/simulation/stop/{vessel_id}
// ---------------------------------------------------------------------------

/// Stop one vessel's simulation.
pub async fn stop<G: VesselGateway>(
    State(state): State<Arc<AppState<G>>>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let vessel_id = parse_vessel_id(&raw_id)?;
    state.registry.stop(vessel_id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Simulation stopped for vessel {vessel_id}"),
    })))
}

// ---------------------------------------------------------------------------
// POST /api/simulation/stop-all
// ---------------------------------------------------------------------------

/// Stop every running simulation.
pub async fn stop_all<G: VesselGateway>(
    State(state): State<Arc<AppState<G>>>,
) -> impl IntoResponse {
    let stopped = state.registry.stop_all().await;
    Json(serde_json::json!({
        "success": true,
        "message": format!("Stopped {stopped} simulations"),
        "stopped": stopped,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/simulation/reactivate/{vessel_id}
// ---------------------------------------------------------------------------

/// Return a docked vessel to service. Does not start a simulation.
pub async fn reactivate<G: VesselGateway>(
    State(state): State<Arc<AppState<G>>>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let vessel_id = parse_vessel_id(&raw_id)?;
    state.registry.reactivate(vessel_id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Vessel {vessel_id} reactivated"),
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_vessel_id(raw: &str) -> Result<VesselId, ApiError> {
    raw.parse::<VesselId>()
        .map_err(|e| ApiError::InvalidVesselId(format!("{raw}: {e}")))
}

/// An empty body means "use the configured defaults".
fn parse_options(body: &[u8]) -> Result<StartOptions, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StartOptions::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_uses_defaults() {
        assert_eq!(parse_options(b"").unwrap(), StartOptions::default());
        assert_eq!(parse_options(b"  \n").unwrap(), StartOptions::default());
    }

    #[test]
    fn body_overrides_are_camel_case() {
        let options = parse_options(br#"{"speed": 12.5, "intervalMs": 500}"#).unwrap();
        assert_eq!(options.speed, Some(12.5));
        assert_eq!(options.interval_ms, Some(500));
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(
            parse_options(b"{speed"),
            Err(ApiError::InvalidBody(_))
        ));
        assert!(matches!(
            parse_vessel_id("abc"),
            Err(ApiError::InvalidVesselId(_))
        ));
        assert_eq!(parse_vessel_id(" 42 ").unwrap(), VesselId(42));
    }
}

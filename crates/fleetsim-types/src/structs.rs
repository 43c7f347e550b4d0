//! Core entity structs shared between the simulator, the store adapter,
//! and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{RejectionReason, VesselStatus};
use crate::ids::{SimulationRunId, VesselId};

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point from latitude and longitude.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both coordinates are finite numbers.
    pub const fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// An ordered point on a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Waypoint {
    /// 1-based position of the waypoint within its route.
    pub sequence: u32,
    /// Coordinates of the waypoint.
    pub point: GeoPoint,
}

impl Waypoint {
    /// Create a waypoint at the given sequence position.
    pub const fn new(sequence: u32, latitude: f64, longitude: f64) -> Self {
        Self {
            sequence,
            point: GeoPoint::new(latitude, longitude),
        }
    }
}

// ---------------------------------------------------------------------------
// Vessel state
// ---------------------------------------------------------------------------

/// The vessel record as read through the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct VesselSnapshot {
    /// Vessel identifier.
    pub id: VesselId,
    /// Display name.
    pub name: String,
    /// Operational status.
    pub status: VesselStatus,
    /// Last known position, if the vessel has ever reported one.
    pub position: Option<GeoPoint>,
    /// Last known speed over ground in knots.
    pub speed_knots: f64,
    /// Last known heading in degrees.
    pub heading_degrees: f64,
}

/// One position report appended to a vessel's track history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LocationSample {
    /// The vessel this sample belongs to.
    pub vessel_id: VesselId,
    /// Reported position.
    pub position: GeoPoint,
    /// Speed over ground in knots.
    pub speed_knots: f64,
    /// Heading in degrees, `[0, 360)`.
    pub heading_degrees: f64,
    /// When the sample was produced.
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Simulation commands
// ---------------------------------------------------------------------------

/// Per-start overrides for a vessel simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StartOptions {
    /// Configured speed in knots. Falls back to the simulator default.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Tick interval in milliseconds. Falls back to the simulator default.
    #[serde(default)]
    pub interval_ms: Option<u64>,
}

/// Details of a successfully started simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StartReport {
    /// The simulation run that was created.
    pub run_id: SimulationRunId,
    /// Vessel identifier.
    pub vessel_id: VesselId,
    /// Vessel display name.
    pub vessel_name: String,
    /// Number of waypoints on the active route.
    pub waypoint_count: usize,
    /// Index of the segment the vessel starts on.
    pub starting_index: usize,
    /// Configured speed in knots.
    pub speed_knots: f64,
    /// Tick interval in milliseconds.
    pub interval_ms: u64,
}

/// Outcome of one vessel within a start-all batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StartAllEntry {
    /// Vessel identifier.
    pub vessel_id: VesselId,
    /// Whether the simulation started.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Start details when `success` is true.
    pub report: Option<StartReport>,
    /// Rejection details when the start was refused.
    pub rejection: Option<RejectionReason>,
}

/// Result of starting every eligible vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StartAllReport {
    /// Number of simulations that started.
    pub started: usize,
    /// One entry per eligible vessel, ordered by vessel id.
    pub results: Vec<StartAllEntry>,
}

/// Read-only view of one vessel's simulation.
///
/// When no simulation is registered only `running = false` is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SimulationStatus {
    /// Whether a simulation is registered for the vessel.
    pub running: bool,
    /// Vessel identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub vessel_id: Option<VesselId>,
    /// Vessel display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub vessel_name: Option<String>,
    /// Index of the waypoint the current segment starts from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub current_waypoint_index: Option<usize>,
    /// Number of waypoints on the route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub total_waypoints: Option<usize>,
    /// Fraction of the current segment covered, `[0, 1)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub progress: Option<f64>,
    /// Whether the docking sequence has begun.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub docked: Option<bool>,
    /// Configured speed in knots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub speed: Option<f64>,
}

impl SimulationStatus {
    /// Status of a vessel with no registered simulation.
    pub fn not_running() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn not_running_status_serializes_only_the_flag() {
        let json = serde_json::to_value(SimulationStatus::not_running()).unwrap();
        assert_eq!(json, serde_json::json!({ "running": false }));
    }

    #[test]
    fn skipped_status_fields_are_optional_in_bindings() {
        let decl = SimulationStatus::decl();
        assert!(decl.contains("running: boolean"), "{decl}");
        for field in [
            "vesselId?:",
            "vesselName?:",
            "currentWaypointIndex?:",
            "totalWaypoints?:",
            "progress?:",
            "docked?:",
            "speed?:",
        ] {
            assert!(decl.contains(field), "missing {field} in {decl}");
        }
        assert!(!decl.contains("| null"), "{decl}");
    }

    #[test]
    fn start_options_accept_camel_case_and_missing_fields() {
        let opts: StartOptions = serde_json::from_str(r#"{"intervalMs": 500}"#).unwrap();
        assert_eq!(opts.interval_ms, Some(500));
        assert!(opts.speed.is_none());

        let empty: StartOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, StartOptions::default());
    }

    #[test]
    fn non_finite_points_are_detected() {
        assert!(GeoPoint::new(1.0, 2.0).is_finite());
        assert!(!GeoPoint::new(f64::NAN, 2.0).is_finite());
        assert!(!GeoPoint::new(1.0, f64::INFINITY).is_finite());
    }
}

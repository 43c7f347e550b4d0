//! Enumeration types for vessels, routes, and simulation commands.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Vessel status
// ---------------------------------------------------------------------------

/// Operational status of a vessel.
///
/// Only [`VesselStatus::Active`] vessels can be simulated. The simulator
/// itself performs exactly two transitions: `Active -> Docked` when a
/// vessel reaches the end of its route, and `Docked -> Active` on an
/// explicit reactivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum VesselStatus {
    /// Under way or ready to sail.
    Active,
    /// Moored at the final waypoint of its last route.
    Docked,
    /// Out of service.
    Maintenance,
}

impl VesselStatus {
    /// The canonical string stored in the relational store.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Docked => "Docked",
            Self::Maintenance => "Maintenance",
        }
    }
}

impl core::fmt::Display for VesselStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string from the store is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl core::fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl core::str::FromStr for VesselStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "docked" => Ok(Self::Docked),
            "maintenance" => Ok(Self::Maintenance),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Route status
// ---------------------------------------------------------------------------

/// Lifecycle status of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum RouteStatus {
    /// Drafted but not yet sailing.
    Planned,
    /// Currently driving its vessel's simulation.
    Active,
    /// The vessel docked at the final waypoint.
    Completed,
}

impl RouteStatus {
    /// The canonical string stored in the relational store.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl core::fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for RouteStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Rejection reasons
// ---------------------------------------------------------------------------

/// Why a simulation command was refused.
///
/// These are precondition failures: they are reported back to the caller
/// as structured results and are never retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "reason", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RejectionReason {
    /// A simulation is already registered for the vessel.
    AlreadyRunning,
    /// No simulation is registered for the vessel.
    NotRunning,
    /// The vessel record does not exist.
    VesselNotFound,
    /// The vessel's status does not allow the command.
    InvalidVesselState {
        /// The status the vessel is currently in.
        status: VesselStatus,
    },
    /// The vessel's active route has fewer than two waypoints.
    InsufficientWaypoints {
        /// Number of waypoints found on the active route.
        count: usize,
    },
    /// Reactivation was requested for a vessel that is not docked.
    NotDocked {
        /// The status the vessel is currently in.
        status: VesselStatus,
    },
    /// The per-start speed or interval override is out of range.
    InvalidOptions {
        /// Explanation of which option is wrong.
        detail: String,
    },
}

impl core::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyRunning => f.write_str("Simulation already running for this vessel"),
            Self::NotRunning => f.write_str("No active simulation for this vessel"),
            Self::VesselNotFound => f.write_str("Vessel not found"),
            Self::InvalidVesselState { status } => {
                write!(f, "Vessel is {status}, cannot start simulation")
            }
            Self::InsufficientWaypoints { count } => write!(
                f,
                "Not enough waypoints for route simulation ({count} found, at least 2 required)"
            ),
            Self::NotDocked { status } => {
                write!(f, "Vessel is {status}, only docked vessels can be reactivated")
            }
            Self::InvalidOptions { detail } => write!(f, "Invalid simulation options: {detail}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn vessel_status_round_trips_through_store_strings() {
        for status in [
            VesselStatus::Active,
            VesselStatus::Docked,
            VesselStatus::Maintenance,
        ] {
            assert_eq!(status.as_str().parse::<VesselStatus>().unwrap(), status);
        }
        assert!("sunk".parse::<VesselStatus>().is_err());
    }

    #[test]
    fn route_status_parsing_ignores_case() {
        assert_eq!("ACTIVE".parse::<RouteStatus>().unwrap(), RouteStatus::Active);
        assert_eq!(
            serde_json::to_string(&RouteStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn rejection_serializes_with_reason_tag() {
        let json = serde_json::to_value(RejectionReason::InvalidVesselState {
            status: VesselStatus::Maintenance,
        })
        .unwrap();
        assert_eq!(json["reason"], "invalid_vessel_state");
        assert_eq!(json["status"], "Maintenance");
    }

    #[test]
    fn rejection_messages_name_the_status() {
        let msg = RejectionReason::InvalidVesselState {
            status: VesselStatus::Docked,
        }
        .to_string();
        assert_eq!(msg, "Vessel is Docked, cannot start simulation");
    }
}

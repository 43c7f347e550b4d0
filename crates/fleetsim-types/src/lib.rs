//! Shared type definitions for the fleet movement simulator.
//!
//! This crate is the single source of truth for the types exchanged between
//! the simulation core, the relational store adapter, and the HTTP layer.
//! Types flow downstream to `TypeScript` via `ts-rs` for the fleet map
//! dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for vessel, route, and run identifiers
//! - [`enums`] -- Vessel and route statuses, command rejection reasons
//! - [`structs`] -- Waypoints, vessel snapshots, location samples, and
//!   simulation status/report payloads

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{RejectionReason, RouteStatus, UnknownStatus, VesselStatus};
pub use ids::{RouteId, SimulationRunId, VesselId};
pub use structs::{
    GeoPoint, LocationSample, SimulationStatus, StartAllEntry, StartAllReport, StartOptions,
    StartReport, VesselSnapshot, Waypoint,
};

//! Vessel movement engine and simulation registry for the fleet simulator.
//!
//! Each simulated vessel interpolates along the waypoints of its active
//! route on a fixed real-time tick. Position updates are written through a
//! [`VesselGateway`]; when the final waypoint is reached the vessel is
//! docked and its route completed.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `fleetsim-config.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- Per-vessel interpolation state and the tick step.
//! - [`gateway`] -- [`VesselGateway`] trait, the boundary to the store.
//! - [`geometry`] -- Bearings, distances, and nearest-waypoint search.
//! - [`memory`] -- [`InMemoryGateway`] for tests and local runs.
//! - [`registry`] -- [`SimulationRegistry`], the start/stop/status surface.
//!
//! [`VesselGateway`]: gateway::VesselGateway
//! [`InMemoryGateway`]: memory::InMemoryGateway
//! [`SimulationRegistry`]: registry::SimulationRegistry

pub mod config;
pub mod engine;
pub mod gateway;
pub mod geometry;
pub mod memory;
pub mod registry;
mod runner;

pub use config::{ConfigError, FleetConfig, SimulationConfig};
pub use gateway::{GatewayError, VesselGateway};
pub use memory::InMemoryGateway;
pub use registry::{SimulationError, SimulationRegistry};

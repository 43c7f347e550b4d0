//! HTTP control API for the fleet simulator.
//!
//! This crate provides an Axum HTTP server that exposes the
//! [`SimulationRegistry`](fleetsim_core::SimulationRegistry) operations:
//! start, stop, and status per vessel, the fleet-wide start-all and
//! stop-all commands, and reactivation of docked vessels.
//!
//! # Modules
//!
//! - [`error`] -- [`ApiError`] and its HTTP rendering
//! - [`handlers`] -- Endpoint handlers
//! - [`router`] -- [`build_router`]
//! - [`server`] -- [`start_server`] with graceful shutdown
//! - [`state`] -- [`AppState`]

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;

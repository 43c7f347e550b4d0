//! `PostgreSQL` data layer for the fleet simulator.
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`gateway`] -- [`PgVesselGateway`], the store-backed
//!   [`VesselGateway`](fleetsim_core::VesselGateway)
//! - [`error`] -- Shared error types

pub mod error;
pub mod gateway;
pub mod postgres;

// Re-export primary types for convenience.
pub use error::DbError;
pub use gateway::{PgVesselGateway, VesselRow, WaypointRow};
pub use postgres::{PostgresConfig, PostgresPool};

//! Boundary between the simulator and the relational store.
//!
//! The simulator never talks to a database directly. Everything it needs
//! (waypoints, the vessel record, appending track samples, and the two
//! docking writes) goes through [`VesselGateway`]. The `fleetsim-db`
//! crate implements it on `PostgreSQL`; [`InMemoryGateway`] implements it
//! for tests and local runs.
//!
//! [`InMemoryGateway`]: crate::memory::InMemoryGateway

use std::future::Future;

use fleetsim_types::{LocationSample, VesselId, VesselSnapshot, VesselStatus, Waypoint};

/// Errors reported by a gateway implementation.
///
/// The simulator treats all of these as transient inside a tick: the tick
/// is abandoned and the next one retries.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A record the operation needs does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record (e.g. `"vessel"`).
        entity: &'static str,
        /// Key that was looked up.
        id: i64,
    },

    /// The store rejected or failed the operation.
    #[error("store error: {message}")]
    Store {
        /// Description of the failure.
        message: String,
    },

    /// The store returned data the simulator cannot interpret.
    #[error("invalid data from store: {message}")]
    InvalidData {
        /// Description of the malformed data.
        message: String,
    },
}

/// Data access operations consumed by the simulator.
///
/// Implementations must be safe to call from many vessel tasks at once.
pub trait VesselGateway: Send + Sync + 'static {
    /// Ordered waypoints of the vessel's active route.
    ///
    /// When a vessel has several active routes the one with the lowest
    /// route id is used. A vessel without an active route yields an empty
    /// list, which is a valid response.
    fn active_route_waypoints(
        &self,
        vessel_id: VesselId,
    ) -> impl Future<Output = Result<Vec<Waypoint>, GatewayError>> + Send;

    /// The vessel record with its latest track sample, or `None` if the
    /// vessel does not exist.
    fn vessel_state(
        &self,
        vessel_id: VesselId,
    ) -> impl Future<Output = Result<Option<VesselSnapshot>, GatewayError>> + Send;

    /// Append a sample to the vessel's track history.
    fn append_location_sample(
        &self,
        sample: &LocationSample,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Overwrite the vessel's operational status.
    fn set_vessel_status(
        &self,
        vessel_id: VesselId,
        status: VesselStatus,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Mark the vessel's active route (same selection as
    /// [`active_route_waypoints`](Self::active_route_waypoints)) completed.
    /// A vessel without an active route is not an error.
    fn complete_active_route(
        &self,
        vessel_id: VesselId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Active vessels that have an active route, ordered by vessel id.
    fn simulatable_vessels(
        &self,
    ) -> impl Future<Output = Result<Vec<VesselId>, GatewayError>> + Send;
}

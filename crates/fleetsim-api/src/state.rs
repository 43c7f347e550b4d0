//! Shared application state for the API server.

use std::sync::Arc;

use fleetsim_core::{SimulationRegistry, VesselGateway};

/// State shared by all handlers.
///
/// The registry is owned here for the lifetime of the server; the binary
/// keeps its own handle so it can stop every simulation on shutdown.
pub struct AppState<G> {
    /// The process-wide simulation registry.
    pub registry: Arc<SimulationRegistry<G>>,
}

impl<G: VesselGateway> AppState<G> {
    /// Wrap an existing registry.
    pub const fn new(registry: Arc<SimulationRegistry<G>>) -> Self {
        Self { registry }
    }
}

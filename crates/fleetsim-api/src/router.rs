//! Axum router construction for the simulation control API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use fleetsim_core::VesselGateway;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// See [`handlers`] for the endpoint table. CORS is configured to allow
/// any origin for the dashboard; there is no authentication.
pub fn build_router<G: VesselGateway>(state: Arc<AppState<G>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::<G>))
        // Queries
        .route("/api/simulation/status", get(handlers::status_all::<G>))
        .route(
            "/api/simulation/status/{vessel_id}",
            get(handlers::status::<G>),
        )
        // Commands
        .route(
            "/api/simulation/start/{vessel_id}",
            post(handlers::start::<G>),
        )
        .route("/api/simulation/start-all", post(handlers::start_all::<G>))
        .route("/api/simulation/stop/{vessel_id}", post(handlers::stop::<G>))
        .route("/api/simulation/stop-all", post(handlers::stop_all::<G>))
        .route(
            "/api/simulation/reactivate/{vessel_id}",
            post(handlers::reactivate::<G>),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! In-memory [`VesselGateway`] used by tests and store-less local runs.
//!
//! Mirrors the relational adapter's selection rules (lowest active route
//! id wins) and records every write so tests can assert on side effects.
//! Append failures can be injected to exercise the tick retry path, and
//! status writes can be slowed down to widen the docking window.

use std::collections::BTreeMap;
use std::time::Duration;

use fleetsim_types::{
    GeoPoint, LocationSample, RouteId, RouteStatus, VesselId, VesselSnapshot, VesselStatus,
    Waypoint,
};
use tokio::sync::Mutex;

use crate::gateway::{GatewayError, VesselGateway};

#[derive(Debug, Clone)]
struct RouteRecord {
    vessel_id: Option<VesselId>,
    status: RouteStatus,
    waypoints: Vec<Waypoint>,
}

#[derive(Debug, Default)]
struct Store {
    vessels: BTreeMap<VesselId, VesselSnapshot>,
    routes: BTreeMap<RouteId, RouteRecord>,
    samples: Vec<LocationSample>,
    status_writes: Vec<(VesselId, VesselStatus)>,
    route_completions: Vec<VesselId>,
    failing_appends: u32,
    status_write_delay: Duration,
}

impl Store {
    fn active_route(&self, vessel_id: VesselId) -> Option<(RouteId, &RouteRecord)> {
        self.routes
            .iter()
            .find(|(_, r)| r.vessel_id == Some(vessel_id) && r.status == RouteStatus::Active)
            .map(|(id, r)| (*id, r))
    }
}

/// A [`VesselGateway`] backed by in-process maps.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    store: Mutex<Store>,
}

impl InMemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a vessel record.
    pub async fn insert_vessel(&self, vessel: VesselSnapshot) {
        self.store.lock().await.vessels.insert(vessel.id, vessel);
    }

    /// Convenience for inserting a vessel with the given status and
    /// optional last known position.
    pub async fn add_vessel(
        &self,
        id: VesselId,
        name: &str,
        status: VesselStatus,
        position: Option<GeoPoint>,
    ) {
        self.insert_vessel(VesselSnapshot {
            id,
            name: name.to_owned(),
            status,
            position,
            speed_knots: 0.0,
            heading_degrees: 0.0,
        })
        .await;
    }

    /// Insert or replace a route.
    pub async fn add_route(
        &self,
        route_id: RouteId,
        vessel_id: Option<VesselId>,
        status: RouteStatus,
        waypoints: Vec<Waypoint>,
    ) {
        self.store.lock().await.routes.insert(
            route_id,
            RouteRecord {
                vessel_id,
                status,
                waypoints,
            },
        );
    }

    /// Make the next `count` appends fail with a store error.
    pub async fn fail_next_appends(&self, count: u32) {
        self.store.lock().await.failing_appends = count;
    }

    /// Sleep for `delay` before applying every subsequent status write.
    pub async fn delay_status_writes(&self, delay: Duration) {
        self.store.lock().await.status_write_delay = delay;
    }

    /// All samples appended for a vessel, oldest first.
    pub async fn samples(&self, vessel_id: VesselId) -> Vec<LocationSample> {
        self.store
            .lock()
            .await
            .samples
            .iter()
            .filter(|s| s.vessel_id == vessel_id)
            .cloned()
            .collect()
    }

    /// Current status of a vessel.
    pub async fn vessel_status(&self, vessel_id: VesselId) -> Option<VesselStatus> {
        self.store
            .lock()
            .await
            .vessels
            .get(&vessel_id)
            .map(|v| v.status)
    }

    /// Current status of a route.
    pub async fn route_status(&self, route_id: RouteId) -> Option<RouteStatus> {
        self.store
            .lock()
            .await
            .routes
            .get(&route_id)
            .map(|r| r.status)
    }

    /// Every status write performed for a vessel, in order.
    pub async fn status_writes(&self, vessel_id: VesselId) -> Vec<VesselStatus> {
        self.store
            .lock()
            .await
            .status_writes
            .iter()
            .filter(|(id, _)| *id == vessel_id)
            .map(|(_, status)| *status)
            .collect()
    }

    /// Number of route completions requested for a vessel.
    pub async fn route_completions(&self, vessel_id: VesselId) -> usize {
        self.store
            .lock()
            .await
            .route_completions
            .iter()
            .filter(|id| **id == vessel_id)
            .count()
    }
}

impl VesselGateway for InMemoryGateway {
    async fn active_route_waypoints(
        &self,
        vessel_id: VesselId,
    ) -> Result<Vec<Waypoint>, GatewayError> {
        let store = self.store.lock().await;
        let mut waypoints = store
            .active_route(vessel_id)
            .map(|(_, r)| r.waypoints.clone())
            .unwrap_or_default();
        waypoints.sort_by_key(|wp| wp.sequence);
        Ok(waypoints)
    }

    async fn vessel_state(
        &self,
        vessel_id: VesselId,
    ) -> Result<Option<VesselSnapshot>, GatewayError> {
        Ok(self.store.lock().await.vessels.get(&vessel_id).cloned())
    }

    async fn append_location_sample(&self, sample: &LocationSample) -> Result<(), GatewayError> {
        let mut store = self.store.lock().await;
        if store.failing_appends > 0 {
            store.failing_appends = store.failing_appends.saturating_sub(1);
            return Err(GatewayError::Store {
                message: "injected append failure".to_owned(),
            });
        }
        let vessel = store
            .vessels
            .get_mut(&sample.vessel_id)
            .ok_or(GatewayError::NotFound {
                entity: "vessel",
                id: sample.vessel_id.into_inner(),
            })?;
        vessel.position = Some(sample.position);
        vessel.speed_knots = sample.speed_knots;
        vessel.heading_degrees = sample.heading_degrees;
        store.samples.push(sample.clone());
        Ok(())
    }

    async fn set_vessel_status(
        &self,
        vessel_id: VesselId,
        status: VesselStatus,
    ) -> Result<(), GatewayError> {
        let delay = self.store.lock().await.status_write_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut store = self.store.lock().await;
        let vessel = store
            .vessels
            .get_mut(&vessel_id)
            .ok_or(GatewayError::NotFound {
                entity: "vessel",
                id: vessel_id.into_inner(),
            })?;
        vessel.status = status;
        store.status_writes.push((vessel_id, status));
        Ok(())
    }

    async fn complete_active_route(&self, vessel_id: VesselId) -> Result<(), GatewayError> {
        let mut store = self.store.lock().await;
        let route_id = store.active_route(vessel_id).map(|(id, _)| id);
        if let Some(route) = route_id.and_then(|id| store.routes.get_mut(&id)) {
            route.status = RouteStatus::Completed;
        }
        store.route_completions.push(vessel_id);
        Ok(())
    }

    async fn simulatable_vessels(&self) -> Result<Vec<VesselId>, GatewayError> {
        let store = self.store.lock().await;
        Ok(store
            .vessels
            .values()
            .filter(|v| v.status == VesselStatus::Active)
            .filter(|v| store.active_route(v.id).is_some())
            .map(|v| v.id)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lowest_active_route_id_wins() {
        let gw = InMemoryGateway::new();
        let vessel = VesselId(1);
        gw.add_vessel(vessel, "Aurora", VesselStatus::Active, None).await;
        gw.add_route(
            RouteId(9),
            Some(vessel),
            RouteStatus::Active,
            vec![Waypoint::new(1, 9.0, 9.0), Waypoint::new(2, 9.0, 10.0)],
        )
        .await;
        gw.add_route(
            RouteId(3),
            Some(vessel),
            RouteStatus::Active,
            vec![Waypoint::new(2, 3.0, 4.0), Waypoint::new(1, 3.0, 3.0)],
        )
        .await;

        let wps = gw.active_route_waypoints(vessel).await.unwrap();
        assert_eq!(wps.len(), 2);
        assert_eq!(wps.first().map(|w| w.sequence), Some(1));
        assert_eq!(wps.first().map(|w| w.point), Some(GeoPoint::new(3.0, 3.0)));

        gw.complete_active_route(vessel).await.unwrap();
        assert_eq!(gw.route_status(RouteId(3)).await, Some(RouteStatus::Completed));
        assert_eq!(gw.route_status(RouteId(9)).await, Some(RouteStatus::Active));
    }

    #[tokio::test]
    async fn injected_append_failures_are_consumed() {
        let gw = InMemoryGateway::new();
        let vessel = VesselId(2);
        gw.add_vessel(vessel, "Borealis", VesselStatus::Active, None).await;
        gw.fail_next_appends(1).await;

        let sample = LocationSample {
            vessel_id: vessel,
            position: GeoPoint::new(1.0, 1.0),
            speed_knots: 8.0,
            heading_degrees: 90.0,
            recorded_at: chrono::Utc::now(),
        };
        assert!(gw.append_location_sample(&sample).await.is_err());
        assert!(gw.append_location_sample(&sample).await.is_ok());
        assert_eq!(gw.samples(vessel).await.len(), 1);

        let state = gw.vessel_state(vessel).await.unwrap().unwrap();
        assert_eq!(state.position, Some(GeoPoint::new(1.0, 1.0)));
    }

    #[tokio::test]
    async fn only_active_vessels_with_active_routes_are_simulatable() {
        let gw = InMemoryGateway::new();
        gw.add_vessel(VesselId(1), "A", VesselStatus::Active, None).await;
        gw.add_vessel(VesselId(2), "B", VesselStatus::Docked, None).await;
        gw.add_vessel(VesselId(3), "C", VesselStatus::Active, None).await;
        for (route, vessel) in [(1, 1), (2, 2)] {
            gw.add_route(RouteId(route), Some(VesselId(vessel)), RouteStatus::Active, vec![])
                .await;
        }
        gw.add_route(RouteId(3), Some(VesselId(3)), RouteStatus::Planned, vec![])
            .await;

        assert_eq!(gw.simulatable_vessels().await.unwrap(), vec![VesselId(1)]);
    }
}

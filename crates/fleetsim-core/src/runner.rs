//! The per-vessel timer loop.
//!
//! Every registered simulation runs [`run_vessel`] on its own Tokio task.
//! The loop owns the vessel's [`SimulationEngine`], so ticks for one vessel
//! are strictly sequential while different vessels tick concurrently.
//! Gateway failures are logged and the tick is dropped; nothing inside a
//! tick can take down another vessel or the registry.
//!
//! Cancellation is only observed between ticks. A tick that has started,
//! including the docking writes, always runs to completion.

use std::sync::{Arc, Weak};

use chrono::Utc;
use fleetsim_types::{
    GeoPoint, LocationSample, SimulationRunId, SimulationStatus, VesselId, VesselStatus,
};
use rand::rngs::StdRng;
use tokio::sync::{Mutex, oneshot, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::engine::{DockingPlan, SimulationEngine, TickOutcome};
use crate::gateway::{GatewayError, VesselGateway};
use crate::registry::Entries;

/// Whether the loop should keep ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickFlow {
    Continue,
    Finished,
}

/// Everything a running simulation needs besides its engine.
pub(crate) struct VesselRun<G> {
    /// Store access.
    pub(crate) gateway: Arc<G>,
    /// The registry map, for self-deregistration on completion.
    pub(crate) entries: Weak<Mutex<Entries>>,
    /// Identifies this run in the registry.
    pub(crate) run_id: SimulationRunId,
    /// Publishes engine state to status queries.
    pub(crate) status: watch::Sender<SimulationStatus>,
    /// Speed jitter source.
    pub(crate) rng: StdRng,
    /// Log every position update at debug level.
    pub(crate) log_ticks: bool,
}

/// Drive one vessel until it docks or `cancel` fires.
///
/// The first tick fires one interval after the call, never synchronously.
/// Dropping the sender counts as a cancel. A cancelled run leaves the
/// registry alone; whoever cancelled it already removed the entry.
pub(crate) async fn run_vessel<G: VesselGateway>(
    mut engine: SimulationEngine,
    mut run: VesselRun<G>,
    mut cancel: oneshot::Receiver<()>,
) {
    let period = engine.params().interval;
    let now = Instant::now();
    let first = now.checked_add(period).unwrap_or(now);
    let mut ticker = time::interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut cancel => {
                debug!(vessel_id = %engine.vessel_id(), "Simulation cancelled between ticks");
                return;
            }
            _ = ticker.tick() => {}
        }
        let flow = run.tick(&mut engine).await;
        run.status.send_replace(engine.status());
        if flow == TickFlow::Finished {
            break;
        }
    }

    run.deregister(engine.vessel_id()).await;
}

impl<G: VesselGateway> VesselRun<G> {
    async fn tick(&mut self, engine: &mut SimulationEngine) -> TickFlow {
        let vessel_id = engine.vessel_id();
        match engine.advance(&mut self.rng) {
            TickOutcome::Moved(fix) => {
                let sample = LocationSample {
                    vessel_id,
                    position: fix.position,
                    speed_knots: fix.speed_knots,
                    heading_degrees: fix.heading_degrees,
                    recorded_at: Utc::now(),
                };
                match self.gateway.append_location_sample(&sample).await {
                    Ok(()) if self.log_ticks => debug!(
                        vessel_id = %vessel_id,
                        waypoint = engine.current_index().saturating_add(1),
                        total_waypoints = engine.total_waypoints(),
                        progress = engine.progress(),
                        latitude = fix.position.latitude,
                        longitude = fix.position.longitude,
                        heading = fix.heading_degrees,
                        "Position updated"
                    ),
                    Ok(()) => {}
                    Err(e) => warn!(
                        vessel_id = %vessel_id,
                        error = %e,
                        "Position update failed, next tick will retry"
                    ),
                }
                TickFlow::Continue
            }
            TickOutcome::Arrived => {
                self.dock(engine).await;
                TickFlow::Finished
            }
            TickOutcome::Corrupt { reason } => {
                error!(
                    vessel_id = %vessel_id,
                    reason,
                    "Route data is unusable, ending simulation"
                );
                self.dock(engine).await;
                TickFlow::Finished
            }
        }
    }

    /// Run the one-shot docking sequence.
    ///
    /// The three writes run in order and the first failure skips the rest.
    async fn dock(&self, engine: &mut SimulationEngine) {
        let vessel_id = engine.vessel_id();
        match engine.begin_docking() {
            DockingPlan::AlreadyDocked => {}
            DockingPlan::Abandon => error!(
                vessel_id = %vessel_id,
                "Final waypoint is unusable, stopping without docking"
            ),
            DockingPlan::DockAt(point) => match self.write_docking(vessel_id, point).await {
                Ok(()) => info!(
                    vessel_id = %vessel_id,
                    vessel_name = engine.vessel_name(),
                    latitude = point.latitude,
                    longitude = point.longitude,
                    "Vessel docked"
                ),
                Err(e) => error!(vessel_id = %vessel_id, error = %e, "Docking failed"),
            },
        }
    }

    async fn write_docking(&self, vessel_id: VesselId, point: GeoPoint) -> Result<(), GatewayError> {
        let stationary = LocationSample {
            vessel_id,
            position: point,
            speed_knots: 0.0,
            heading_degrees: 0.0,
            recorded_at: Utc::now(),
        };
        self.gateway.append_location_sample(&stationary).await?;
        self.gateway
            .set_vessel_status(vessel_id, VesselStatus::Docked)
            .await?;
        self.gateway.complete_active_route(vessel_id).await
    }

    /// Remove this run from the registry unless a newer run replaced it.
    async fn deregister(&self, vessel_id: VesselId) {
        let Some(entries) = self.entries.upgrade() else {
            return;
        };
        let mut entries = entries.lock().await;
        if entries
            .get(&vessel_id)
            .is_some_and(|handle| handle.run_id() == self.run_id)
        {
            entries.remove(&vessel_id);
            debug!(vessel_id = %vessel_id, run_id = %self.run_id, "Simulation deregistered");
        }
    }
}

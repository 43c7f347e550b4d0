//! Process-wide registry of running vessel simulations.
//!
//! [`SimulationRegistry`] is the single source of truth for "is vessel X
//! simulating". It is constructed once at startup and shared by handle
//! (`Arc`) with whatever exposes the start/stop operations.
//!
//! # Concurrency
//!
//! All registry mutations go through one `tokio::sync::Mutex`. `start`
//! holds it across its precondition reads so two concurrent starts for the
//! same vessel cannot both pass the "not running" check. Those reads hit
//! the store, so a slow store delays every other registry command for up
//! to the configured statement timeout.
//!
//! `stop` removes the entry under the lock, releases it, then signals the
//! vessel task and waits for it to finish, so no tick runs after `stop`
//! returns. The signal is only seen while the task waits for its next
//! tick: a tick already in progress, docking included, completes first and
//! the vessel never ends up half-docked. A vessel task that docks removes
//! its own entry, matched by run id so it never evicts a newer run for the
//! same vessel.

use std::collections::BTreeMap;
use std::sync::Arc;

use fleetsim_types::{
    RejectionReason, SimulationRunId, SimulationStatus, StartAllEntry, StartAllReport,
    StartOptions, StartReport, VesselId, VesselStatus,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{Mutex, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::engine::{EngineError, MotionParams, SimulationEngine};
use crate::gateway::{GatewayError, VesselGateway};
use crate::geometry;
use crate::runner::{self, VesselRun};

/// Registry map: one handle per simulating vessel.
pub(crate) type Entries = BTreeMap<VesselId, SimulationHandle>;

/// Why a registry operation did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// A precondition failed; the command was refused.
    #[error("{0}")]
    Rejected(RejectionReason),

    /// The store could not be read while checking preconditions.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl From<RejectionReason> for SimulationError {
    fn from(reason: RejectionReason) -> Self {
        Self::Rejected(reason)
    }
}

impl SimulationError {
    /// The rejection reason, if this is a precondition failure.
    pub const fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            Self::Rejected(reason) => Some(reason),
            Self::Gateway(_) => None,
        }
    }
}

/// A running simulation as seen by the registry.
pub(crate) struct SimulationHandle {
    run_id: SimulationRunId,
    status: watch::Receiver<SimulationStatus>,
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SimulationHandle {
    pub(crate) const fn run_id(&self) -> SimulationRunId {
        self.run_id
    }

    /// Tell the vessel task to stop after its current tick and wait for it.
    async fn cancel(self) {
        // The task may already have exited after docking.
        let _ = self.cancel.send(());
        if let Err(e) = self.task.await
            && e.is_panic()
        {
            warn!(run_id = %self.run_id, error = %e, "Simulation task had panicked");
        }
    }
}

/// Owns every running vessel simulation.
pub struct SimulationRegistry<G> {
    gateway: Arc<G>,
    config: SimulationConfig,
    entries: Arc<Mutex<Entries>>,
}

impl<G: VesselGateway> SimulationRegistry<G> {
    /// Create an empty registry.
    pub fn new(gateway: Arc<G>, config: SimulationConfig) -> Self {
        Self {
            gateway,
            config,
            entries: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// The gateway shared with every vessel task.
    pub const fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Simulation defaults applied to start requests.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Start
    // -----------------------------------------------------------------------

    /// Start simulating a vessel along its active route.
    ///
    /// Preconditions, checked in order: no simulation registered for the
    /// vessel, valid options, the vessel exists, its status is
    /// [`VesselStatus::Active`], and its active route has at least two
    /// waypoints. The vessel starts one segment before the waypoint nearest
    /// to its last known position. The first position update follows one
    /// tick interval later.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Rejected`] when a precondition fails and
    /// [`SimulationError::Gateway`] when the store cannot be read. Neither
    /// leaves a registry entry behind.
    pub async fn start(
        &self,
        vessel_id: VesselId,
        options: StartOptions,
    ) -> Result<StartReport, SimulationError> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(&vessel_id) {
            return Err(RejectionReason::AlreadyRunning.into());
        }

        let params = self.motion_params(options)?;

        let vessel = self
            .gateway
            .vessel_state(vessel_id)
            .await?
            .ok_or(RejectionReason::VesselNotFound)?;
        if vessel.status != VesselStatus::Active {
            return Err(RejectionReason::InvalidVesselState {
                status: vessel.status,
            }
            .into());
        }

        let waypoints = self.gateway.active_route_waypoints(vessel_id).await?;
        let starting_index = geometry::starting_index(&waypoints, vessel.position);
        let engine = SimulationEngine::new(
            vessel_id,
            vessel.name.clone(),
            waypoints,
            starting_index,
            params,
        )
        .map_err(|EngineError::InsufficientWaypoints { count }| {
            RejectionReason::InsufficientWaypoints { count }
        })?;

        let report = StartReport {
            run_id: SimulationRunId::new(),
            vessel_id,
            vessel_name: vessel.name,
            waypoint_count: engine.total_waypoints(),
            starting_index: engine.current_index(),
            speed_knots: params.speed_knots,
            interval_ms: options.interval_ms.unwrap_or(self.config.tick_interval_ms),
        };

        let (status_tx, status_rx) = watch::channel(engine.status());
        let run = VesselRun {
            gateway: Arc::clone(&self.gateway),
            entries: Arc::downgrade(&self.entries),
            run_id: report.run_id,
            status: status_tx,
            rng: self.jitter_rng(vessel_id),
            log_ticks: self.config.log_ticks,
        };
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = tokio::spawn(runner::run_vessel(engine, run, cancel_rx));
        entries.insert(
            vessel_id,
            SimulationHandle {
                run_id: report.run_id,
                status: status_rx,
                cancel: cancel_tx,
                task,
            },
        );

        info!(
            vessel_id = %vessel_id,
            vessel_name = report.vessel_name,
            run_id = %report.run_id,
            waypoints = report.waypoint_count,
            starting_index = report.starting_index,
            speed_knots = report.speed_knots,
            interval_ms = report.interval_ms,
            "Simulation started"
        );
        Ok(report)
    }

    /// Start every active vessel that has an active route.
    ///
    /// Vessels are started one after another in id order; a refusal or a
    /// store error for one vessel is recorded in its entry and does not
    /// stop the batch.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] only if the list of eligible vessels cannot
    /// be read.
    pub async fn start_all(&self, options: StartOptions) -> Result<StartAllReport, GatewayError> {
        let vessels = self.gateway.simulatable_vessels().await?;
        let mut results = Vec::with_capacity(vessels.len());
        let mut started: usize = 0;

        for vessel_id in vessels {
            let entry = match self.start(vessel_id, options).await {
                Ok(report) => {
                    started = started.saturating_add(1);
                    StartAllEntry {
                        vessel_id,
                        success: true,
                        message: format!("Simulation started for vessel {}", report.vessel_name),
                        report: Some(report),
                        rejection: None,
                    }
                }
                Err(SimulationError::Rejected(reason)) => StartAllEntry {
                    vessel_id,
                    success: false,
                    message: reason.to_string(),
                    report: None,
                    rejection: Some(reason),
                },
                Err(SimulationError::Gateway(e)) => StartAllEntry {
                    vessel_id,
                    success: false,
                    message: e.to_string(),
                    report: None,
                    rejection: None,
                },
            };
            results.push(entry);
        }

        info!(started, eligible = results.len(), "Start-all completed");
        Ok(StartAllReport { started, results })
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Stop a vessel's simulation.
    ///
    /// A tick already in progress, docking included, finishes first. When
    /// this returns, the vessel task has terminated and no further ticks
    /// will fire. Calling it again reports
    /// [`RejectionReason::NotRunning`].
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Rejected`] with `NotRunning` if nothing
    /// is registered for the vessel.
    pub async fn stop(&self, vessel_id: VesselId) -> Result<(), SimulationError> {
        let handle = self.entries.lock().await.remove(&vessel_id);
        let Some(handle) = handle else {
            return Err(RejectionReason::NotRunning.into());
        };
        let run_id = handle.run_id;
        handle.cancel().await;
        info!(vessel_id = %vessel_id, run_id = %run_id, "Simulation stopped");
        Ok(())
    }

    /// Stop every simulation and clear the registry.
    ///
    /// Returns the number of simulations that were stopped.
    pub async fn stop_all(&self) -> usize {
        let drained = std::mem::take(&mut *self.entries.lock().await);
        let count = drained.len();
        futures::future::join_all(drained.into_values().map(SimulationHandle::cancel)).await;
        info!(count, "All simulations stopped");
        count
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Status of one vessel's simulation. Unregistered vessels report
    /// only `running = false`.
    pub async fn status(&self, vessel_id: VesselId) -> SimulationStatus {
        self.entries
            .lock()
            .await
            .get(&vessel_id)
            .map_or_else(SimulationStatus::not_running, |h| h.status.borrow().clone())
    }

    /// Status of every registered simulation, ordered by vessel id.
    pub async fn status_all(&self) -> Vec<SimulationStatus> {
        self.entries
            .lock()
            .await
            .values()
            .map(|h| h.status.borrow().clone())
            .collect()
    }

    /// Whether a simulation is registered for the vessel.
    pub async fn is_running(&self, vessel_id: VesselId) -> bool {
        self.entries.lock().await.contains_key(&vessel_id)
    }

    // -----------------------------------------------------------------------
    // Reactivate
    // -----------------------------------------------------------------------

    /// Move a docked vessel back to [`VesselStatus::Active`].
    ///
    /// Only the vessel record changes; a new simulation still needs an
    /// explicit [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Rejected`] with `VesselNotFound` or
    /// `NotDocked`, or [`SimulationError::Gateway`] on store failure.
    pub async fn reactivate(&self, vessel_id: VesselId) -> Result<(), SimulationError> {
        let vessel = self
            .gateway
            .vessel_state(vessel_id)
            .await?
            .ok_or(RejectionReason::VesselNotFound)?;
        if vessel.status != VesselStatus::Docked {
            return Err(RejectionReason::NotDocked {
                status: vessel.status,
            }
            .into());
        }
        self.gateway
            .set_vessel_status(vessel_id, VesselStatus::Active)
            .await?;
        info!(vessel_id = %vessel_id, vessel_name = vessel.name, "Vessel reactivated");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Resolve per-start overrides against the configured defaults.
    fn motion_params(&self, options: StartOptions) -> Result<MotionParams, RejectionReason> {
        let speed_knots = options.speed.unwrap_or(self.config.default_speed_knots);
        if !(speed_knots.is_finite() && speed_knots > 0.0) {
            return Err(RejectionReason::InvalidOptions {
                detail: format!("speed must be a positive number of knots, got {speed_knots}"),
            });
        }
        if speed_knots > self.config.max_speed_knots {
            return Err(RejectionReason::InvalidOptions {
                detail: format!(
                    "speed must not exceed {} knots, got {speed_knots}",
                    self.config.max_speed_knots
                ),
            });
        }

        let interval_ms = options.interval_ms.unwrap_or(self.config.tick_interval_ms);
        if interval_ms < self.config.min_interval_ms {
            return Err(RejectionReason::InvalidOptions {
                detail: format!(
                    "intervalMs must be at least {}, got {interval_ms}",
                    self.config.min_interval_ms
                ),
            });
        }

        Ok(MotionParams {
            speed_knots,
            interval: std::time::Duration::from_millis(interval_ms),
            speed_variation: self.config.speed_variation,
            time_multiplier: self.config.time_multiplier,
            zero_length_increment: self.config.zero_length_increment,
        })
    }

    /// Jitter source for one run: seeded per vessel when configured.
    fn jitter_rng(&self, vessel_id: VesselId) -> StdRng {
        self.config.seed.map_or_else(
            || StdRng::from_rng(&mut rand::rng()),
            |seed| StdRng::seed_from_u64(seed ^ vessel_id.into_inner().unsigned_abs()),
        )
    }
}

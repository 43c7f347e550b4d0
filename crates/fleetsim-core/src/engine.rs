//! Per-vessel movement state and the pure tick computation.
//!
//! A [`SimulationEngine`] owns the interpolation state of one vessel:
//! which segment it is on, how far along that segment it is, its
//! configured speed, and whether docking has begun. [`advance`] performs
//! one tick of movement without touching any I/O; the caller
//! (see [`crate::runner`]) persists whatever the tick produced.
//!
//! # State machine
//!
//! ```text
//! Traveling --(index reaches last waypoint | corrupt data)--> Completing --> Stopped
//! ```
//!
//! Completing is entered through [`begin_docking`], which hands out the
//! docking target exactly once.
//!
//! [`advance`]: SimulationEngine::advance
//! [`begin_docking`]: SimulationEngine::begin_docking

use std::time::Duration;

use fleetsim_types::{GeoPoint, SimulationStatus, VesselId, Waypoint};
use rand::Rng;

use crate::geometry;

/// Seconds per hour, for converting tick intervals into knots-compatible time.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Errors raised when constructing an engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A route needs a start and an end.
    #[error("route has {count} waypoints, at least 2 are required")]
    InsufficientWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
}

/// Movement parameters fixed for the lifetime of one engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    /// Configured speed in knots before jitter.
    pub speed_knots: f64,
    /// Real time between ticks.
    pub interval: Duration,
    /// Total width of the random speed band (0 disables jitter).
    pub speed_variation: f64,
    /// Simulated time elapsed per unit of real time.
    pub time_multiplier: f64,
    /// Progress added per tick when a segment has zero length.
    pub zero_length_increment: f64,
}

/// A position the vessel should report for this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    /// Interpolated position.
    pub position: GeoPoint,
    /// Jittered speed over ground in knots.
    pub speed_knots: f64,
    /// Bearing of the current segment in degrees.
    pub heading_degrees: f64,
}

/// What a single tick produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The vessel moved along its current segment.
    Moved(PositionFix),
    /// The vessel reached (or was already at) its final waypoint.
    Arrived,
    /// Route data is unusable; the simulation must fail safe.
    Corrupt {
        /// What was wrong.
        reason: String,
    },
}

/// What the docking sequence should do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DockingPlan {
    /// Report the vessel stationary at this point, then dock it.
    DockAt(GeoPoint),
    /// The final waypoint is unusable; stop without writing anything.
    Abandon,
    /// Docking already happened; do nothing.
    AlreadyDocked,
}

/// Interpolation state of one simulated vessel.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    vessel_id: VesselId,
    vessel_name: String,
    waypoints: Vec<Waypoint>,
    current_index: usize,
    progress: f64,
    params: MotionParams,
    docked: bool,
}

impl SimulationEngine {
    /// Create an engine positioned at the start of segment `starting_index`.
    ///
    /// The index is clamped to the last segment of the route.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InsufficientWaypoints`] for routes with fewer
    /// than two waypoints.
    pub fn new(
        vessel_id: VesselId,
        vessel_name: String,
        waypoints: Vec<Waypoint>,
        starting_index: usize,
        params: MotionParams,
    ) -> Result<Self, EngineError> {
        let count = waypoints.len();
        if count < 2 {
            return Err(EngineError::InsufficientWaypoints { count });
        }
        let last_segment = count.saturating_sub(2);
        Ok(Self {
            vessel_id,
            vessel_name,
            waypoints,
            current_index: starting_index.min(last_segment),
            progress: 0.0,
            params,
            docked: false,
        })
    }

    /// The simulated vessel.
    pub const fn vessel_id(&self) -> VesselId {
        self.vessel_id
    }

    /// The vessel's display name.
    pub fn vessel_name(&self) -> &str {
        &self.vessel_name
    }

    /// Index of the waypoint the current segment starts from.
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Fraction of the current segment already covered.
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Whether docking has begun.
    pub const fn is_docked(&self) -> bool {
        self.docked
    }

    /// Movement parameters.
    pub const fn params(&self) -> &MotionParams {
        &self.params
    }

    /// Number of waypoints on the route.
    pub fn total_waypoints(&self) -> usize {
        self.waypoints.len()
    }

    /// Snapshot of the engine for status queries.
    pub fn status(&self) -> SimulationStatus {
        SimulationStatus {
            running: true,
            vessel_id: Some(self.vessel_id),
            vessel_name: Some(self.vessel_name.clone()),
            current_waypoint_index: Some(self.current_index),
            total_waypoints: Some(self.waypoints.len()),
            progress: Some(self.progress),
            docked: Some(self.docked),
            speed: Some(self.params.speed_knots),
        }
    }

    /// Advance the vessel by one tick.
    ///
    /// Progress grows by the distance covered this tick divided by the
    /// segment length. Crossing the end of a segment moves to the next one
    /// with progress reset to 0 (any overshoot is discarded). Reaching the
    /// final waypoint yields [`TickOutcome::Arrived`] without a position.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickOutcome {
        let last = self.waypoints.len().saturating_sub(1);
        if self.docked || self.current_index >= last {
            return TickOutcome::Arrived;
        }

        let (from, to) = match self.segment() {
            Ok(segment) => segment,
            Err(reason) => return TickOutcome::Corrupt { reason },
        };

        let segment_nm = geometry::planar_distance_nm(from, to);
        let speed = self.params.speed_knots * jitter_factor(self.params.speed_variation, rng);
        let covered_nm = distance_per_tick(speed, self.params.interval, self.params.time_multiplier);
        let increment =
            progress_increment(covered_nm, segment_nm, self.params.zero_length_increment);

        self.progress += increment;
        if self.progress >= 1.0 {
            self.current_index = self.current_index.saturating_add(1);
            self.progress = 0.0;
            if self.current_index >= last {
                return TickOutcome::Arrived;
            }
        }

        let (from, to) = match self.segment() {
            Ok(segment) => segment,
            Err(reason) => return TickOutcome::Corrupt { reason },
        };
        let position = geometry::interpolate(from, to, self.progress);
        if !position.is_finite() {
            return TickOutcome::Corrupt {
                reason: format!(
                    "interpolated position is not finite on segment {}",
                    self.current_index
                ),
            };
        }

        TickOutcome::Moved(PositionFix {
            position,
            speed_knots: speed,
            heading_degrees: geometry::bearing(from, to),
        })
    }

    /// Enter the Completing state.
    ///
    /// The first call marks the engine docked and returns where to dock;
    /// every later call returns [`DockingPlan::AlreadyDocked`].
    pub fn begin_docking(&mut self) -> DockingPlan {
        if self.docked {
            return DockingPlan::AlreadyDocked;
        }
        self.docked = true;
        match self.waypoints.last() {
            Some(wp) if wp.point.is_finite() => DockingPlan::DockAt(wp.point),
            _ => DockingPlan::Abandon,
        }
    }

    /// Endpoints of the current segment, validated.
    fn segment(&self) -> Result<(GeoPoint, GeoPoint), String> {
        let next = self.current_index.saturating_add(1);
        let (Some(from), Some(to)) = (self.waypoints.get(self.current_index), self.waypoints.get(next))
        else {
            return Err(format!("segment {} is out of range", self.current_index));
        };
        if !from.point.is_finite() || !to.point.is_finite() {
            return Err(format!(
                "waypoint {} or {} has non-finite coordinates",
                from.sequence, to.sequence
            ));
        }
        Ok((from.point, to.point))
    }
}

/// Multiplier applied to the configured speed for one tick.
///
/// Uniform in `[1 - variation/2, 1 + variation/2)`; exactly 1 when
/// `variation` is not positive.
pub fn jitter_factor<R: Rng + ?Sized>(variation: f64, rng: &mut R) -> f64 {
    if variation <= 0.0 {
        return 1.0;
    }
    (rng.random::<f64>() - 0.5).mul_add(variation, 1.0)
}

/// Nautical miles covered in one tick at `speed_knots`, with real time
/// accelerated by `time_multiplier`.
pub fn distance_per_tick(speed_knots: f64, interval: Duration, time_multiplier: f64) -> f64 {
    let simulated_hours = interval.as_secs_f64() / SECONDS_PER_HOUR * time_multiplier;
    speed_knots * simulated_hours
}

/// Fraction of a segment covered by `covered_nm`.
///
/// Zero-length (or degenerate) segments advance by `zero_length_increment`
/// so the vessel never stalls.
pub fn progress_increment(covered_nm: f64, segment_nm: f64, zero_length_increment: f64) -> f64 {
    if segment_nm > 0.0 && segment_nm.is_finite() {
        covered_nm / segment_nm
    } else {
        zero_length_increment
    }
}

//! [`VesselGateway`] implementation on `PostgreSQL`.
//!
//! Numeric columns are stored as `NUMERIC` with fixed scale (7 decimals for
//! coordinates, 2 for speed and heading) and read back as `float8`.
//! Status columns hold the canonical strings from
//! [`VesselStatus::as_str`] and [`RouteStatus::as_str`].

use fleetsim_core::{GatewayError, VesselGateway};
use fleetsim_types::{
    GeoPoint, LocationSample, RouteStatus, VesselId, VesselSnapshot, VesselStatus, Waypoint,
};
use sqlx::PgPool;

use crate::error::DbError;

/// Picks the vessel's active route; lowest route id wins.
const ACTIVE_ROUTE: &str = r"SELECT route_id FROM routes
    WHERE vessel_id = $1 AND status = $2
    ORDER BY route_id
    LIMIT 1";

/// Gateway backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgVesselGateway {
    pool: PgPool,
}

impl PgVesselGateway {
    /// Create a gateway over an existing pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_waypoints(&self, vessel_id: VesselId) -> Result<Vec<Waypoint>, DbError> {
        let rows = sqlx::query_as::<_, WaypointRow>(&format!(
            r"SELECT w.latitude::DOUBLE PRECISION AS latitude,
                     w.longitude::DOUBLE PRECISION AS longitude,
                     w.order_index
              FROM route_waypoints w
              WHERE w.route_id = ({ACTIVE_ROUTE})
              ORDER BY w.order_index, w.id"
        ))
        .bind(vessel_id.into_inner())
        .bind(RouteStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WaypointRow::into_waypoint).collect()
    }

    async fn load_vessel(&self, vessel_id: VesselId) -> Result<Option<VesselSnapshot>, DbError> {
        let row = sqlx::query_as::<_, VesselRow>(
            r"SELECT v.vessel_id, v.name, v.status,
                     l.latitude::DOUBLE PRECISION AS latitude,
                     l.longitude::DOUBLE PRECISION AS longitude,
                     l.speed::DOUBLE PRECISION AS speed,
                     l.direction::DOUBLE PRECISION AS direction
              FROM vessels v
              LEFT JOIN LATERAL (
                  SELECT latitude, longitude, speed, direction
                  FROM vessel_locations
                  WHERE vessel_id = v.vessel_id
                  ORDER BY recorded_at DESC, id DESC
                  LIMIT 1
              ) l ON TRUE
              WHERE v.vessel_id = $1",
        )
        .bind(vessel_id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        row.map(VesselRow::into_snapshot).transpose()
    }

    async fn insert_sample(&self, sample: &LocationSample) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO vessel_locations (vessel_id, latitude, longitude, speed, direction, recorded_at)
              VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(sample.vessel_id.into_inner())
        .bind(sample.position.latitude)
        .bind(sample.position.longitude)
        .bind(sample.speed_knots)
        .bind(sample.heading_degrees)
        .bind(sample.recorded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_status(&self, vessel_id: VesselId, status: VesselStatus) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE vessels SET status = $2 WHERE vessel_id = $1")
            .bind(vessel_id.into_inner())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::InvalidRow(format!("vessel {vessel_id} does not exist")));
        }
        Ok(())
    }

    async fn complete_route(&self, vessel_id: VesselId) -> Result<(), DbError> {
        let result = sqlx::query(&format!(
            "UPDATE routes SET status = $3 WHERE route_id = ({ACTIVE_ROUTE})"
        ))
        .bind(vessel_id.into_inner())
        .bind(RouteStatus::Active.as_str())
        .bind(RouteStatus::Completed.as_str())
        .execute(&self.pool)
        .await?;
        tracing::debug!(
            vessel_id = %vessel_id,
            routes = result.rows_affected(),
            "Completed active route"
        );
        Ok(())
    }

    async fn list_simulatable(&self) -> Result<Vec<VesselId>, DbError> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            r"SELECT DISTINCT v.vessel_id
              FROM vessels v
              JOIN routes r ON r.vessel_id = v.vessel_id AND r.status = $2
              WHERE v.status = $1
              ORDER BY v.vessel_id",
        )
        .bind(VesselStatus::Active.as_str())
        .bind(RouteStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| VesselId(id)).collect())
    }
}

impl VesselGateway for PgVesselGateway {
    async fn active_route_waypoints(
        &self,
        vessel_id: VesselId,
    ) -> Result<Vec<Waypoint>, GatewayError> {
        Ok(self.load_waypoints(vessel_id).await?)
    }

    async fn vessel_state(
        &self,
        vessel_id: VesselId,
    ) -> Result<Option<VesselSnapshot>, GatewayError> {
        Ok(self.load_vessel(vessel_id).await?)
    }

    async fn append_location_sample(&self, sample: &LocationSample) -> Result<(), GatewayError> {
        Ok(self.insert_sample(sample).await?)
    }

    async fn set_vessel_status(
        &self,
        vessel_id: VesselId,
        status: VesselStatus,
    ) -> Result<(), GatewayError> {
        Ok(self.update_status(vessel_id, status).await?)
    }

    async fn complete_active_route(&self, vessel_id: VesselId) -> Result<(), GatewayError> {
        Ok(self.complete_route(vessel_id).await?)
    }

    async fn simulatable_vessels(&self) -> Result<Vec<VesselId>, GatewayError> {
        Ok(self.list_simulatable().await?)
    }
}

/// A row from `route_waypoints`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WaypointRow {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Position of the waypoint within its route.
    pub order_index: i32,
}

impl WaypointRow {
    fn into_waypoint(self) -> Result<Waypoint, DbError> {
        let sequence = u32::try_from(self.order_index).map_err(|_| {
            DbError::InvalidRow(format!("negative waypoint order {}", self.order_index))
        })?;
        Ok(Waypoint::new(sequence, self.latitude, self.longitude))
    }
}

/// A vessel joined with its latest `vessel_locations` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VesselRow {
    /// Vessel key.
    pub vessel_id: i64,
    /// Display name.
    pub name: String,
    /// Status string.
    pub status: String,
    /// Latest latitude, if any sample exists.
    pub latitude: Option<f64>,
    /// Latest longitude, if any sample exists.
    pub longitude: Option<f64>,
    /// Latest speed in knots.
    pub speed: Option<f64>,
    /// Latest heading in degrees.
    pub direction: Option<f64>,
}

impl VesselRow {
    fn into_snapshot(self) -> Result<VesselSnapshot, DbError> {
        let status = self
            .status
            .parse::<VesselStatus>()
            .map_err(|e| DbError::InvalidRow(format!("vessel {}: {e}", self.vessel_id)))?;
        let position = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        };
        Ok(VesselSnapshot {
            id: VesselId(self.vessel_id),
            name: self.name,
            status,
            position,
            speed_knots: self.speed.unwrap_or_default(),
            heading_degrees: self.direction.unwrap_or_default(),
        })
    }
}

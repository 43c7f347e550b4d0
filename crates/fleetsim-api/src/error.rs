//! Error types for the simulation control API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body carries `success: false` and a human-readable `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fleetsim_core::{GatewayError, SimulationError};
use fleetsim_types::RejectionReason;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The registry refused the command.
    #[error("{0}")]
    Rejected(RejectionReason),

    /// The store failed while the command was evaluated.
    #[error("store unavailable: {0}")]
    Gateway(#[from] GatewayError),

    /// The vessel id in the path is not an integer.
    #[error("invalid vessel id: {0}")]
    InvalidVesselId(String),

    /// The request body is not valid JSON for this endpoint.
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl From<SimulationError> for ApiError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::Rejected(reason) => Self::Rejected(reason),
            SimulationError::Gateway(e) => Self::Gateway(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, mut body) = match self {
            Self::Rejected(reason) => (
                StatusCode::BAD_REQUEST,
                // The tagged reason contributes `reason` plus its detail fields.
                serde_json::to_value(&reason).unwrap_or_else(|_| serde_json::json!({})),
            ),
            Self::InvalidVesselId(_) | Self::InvalidBody(_) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({}))
            }
            Self::Gateway(e) => {
                tracing::error!(error = %e, "Simulation command failed on store access");
                (StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({}))
            }
        };

        if let Some(fields) = body.as_object_mut() {
            fields.insert("success".to_owned(), serde_json::Value::Bool(false));
            fields.insert("message".to_owned(), serde_json::Value::String(message));
        }

        (status, axum::Json(body)).into_response()
    }
}

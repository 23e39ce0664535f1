//! Route handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use contracts::{Calibration, FrameSource};
use serde::Serialize;
use serde_json::{json, Value};
use sync_engine::CalibrationStatus;
use telemetry::{Delivery, RelayMetricsSnapshot, TelemetryError};
use tracing::{debug, warn};

use super::AppState;

/// Calibration payload; failures are reported in-band with status 200
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CalibrationResponse {
    Available(Calibration),
    Unavailable { error: String },
}

pub async fn calibration<S>(State(state): State<AppState<S>>) -> Json<CalibrationResponse>
where
    S: FrameSource + Send + Sync + 'static,
{
    match state.calibration.get_calibration().await {
        CalibrationStatus::Available(calibration) => {
            observability::record_calibration_request(true);
            Json(CalibrationResponse::Available(calibration))
        }
        CalibrationStatus::Unavailable { reason } => {
            observability::record_calibration_request(false);
            Json(CalibrationResponse::Unavailable { error: reason })
        }
    }
}

/// Forward one pose message to the actuator controller.
///
/// The body must be a JSON document; it is re-serialized compactly so the
/// sink always receives exactly one line per message.
pub async fn pose<S>(State(state): State<AppState<S>>, body: String) -> (StatusCode, Json<Value>)
where
    S: FrameSource + Send + Sync + 'static,
{
    observability::record_pose_received(body.len());

    let message: Value = match serde_json::from_str(&body) {
        Ok(message) => message,
        Err(e) => {
            debug!(error = %e, "rejected malformed pose message");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("invalid pose message: {}", e) })),
            );
        }
    };

    match state.relay.send(&message.to_string()).await {
        Ok(Delivery::Sent) => (StatusCode::OK, Json(json!({ "status": "sent" }))),
        Ok(Delivery::Skipped) => (StatusCode::OK, Json(json!({ "status": "skipped" }))),
        Err(e @ TelemetryError::InvalidMessage) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        ),
        Err(e) => {
            warn!(error = %e, "pose message not delivered");
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() })))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    camera: bool,
    telemetry_connected: bool,
    telemetry: RelayMetricsSnapshot,
}

pub async fn health<S>(State(state): State<AppState<S>>) -> Json<HealthResponse>
where
    S: FrameSource + Send + Sync + 'static,
{
    let camera = state.camera.is_some();
    Json(HealthResponse {
        status: if camera { "ok" } else { "degraded" },
        camera,
        telemetry_connected: state.relay.is_connected().await,
        telemetry: state.relay.metrics(),
    })
}

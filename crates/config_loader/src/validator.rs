//! Configuration validation
//!
//! Rules:
//! - server.bind is a socket address
//! - output dimensions non-zero and even
//! - fps > 0 and clock_rate divisible by fps (integer pts step)
//! - telemetry target complete when enabled
//! - calibration baseline positive

use std::net::SocketAddr;

use contracts::{CameraKind, ContractError, RelayConfig};

const MAX_FPS: u32 = 240;

/// Validate RelayConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &RelayConfig) -> Result<(), ContractError> {
    validate_server(config)?;
    validate_camera(config)?;
    validate_stream(config)?;
    validate_telemetry(config)?;
    Ok(())
}

fn validate_server(config: &RelayConfig) -> Result<(), ContractError> {
    config.server.bind.parse::<SocketAddr>().map_err(|e| {
        ContractError::config_validation(
            "server.bind",
            format!("invalid address '{}': {e}", config.server.bind),
        )
    })?;
    Ok(())
}

fn validate_camera(config: &RelayConfig) -> Result<(), ContractError> {
    let camera = &config.camera;
    if camera.kind == CameraKind::Disabled {
        return Ok(());
    }

    for (field, value) in [
        ("camera.width", camera.width),
        ("camera.height", camera.height),
        ("camera.sensor_width", camera.sensor_width),
        ("camera.sensor_height", camera.sensor_height),
    ] {
        if value == 0 {
            return Err(ContractError::config_validation(field, "must be > 0"));
        }
    }

    // 4:2:0 encoders reject odd output dimensions
    if camera.width % 2 != 0 || camera.height % 2 != 0 {
        return Err(ContractError::config_validation(
            "camera.width / camera.height",
            format!(
                "output dimensions must be even, got {}x{}",
                camera.width, camera.height
            ),
        ));
    }

    if let Some(ref calib) = camera.calibration {
        if !(calib.baseline_m.is_finite() && calib.baseline_m > 0.0) {
            return Err(ContractError::config_validation(
                "camera.calibration.baseline_m",
                format!("baseline must be > 0, got {}", calib.baseline_m),
            ));
        }
    }

    Ok(())
}

fn validate_stream(config: &RelayConfig) -> Result<(), ContractError> {
    let stream = &config.stream;
    if stream.fps == 0 || stream.fps > MAX_FPS {
        return Err(ContractError::config_validation(
            "stream.fps",
            format!("fps must be in 1..={MAX_FPS}, got {}", stream.fps),
        ));
    }

    if stream.clock_rate == 0 || stream.clock_rate % stream.fps != 0 {
        return Err(ContractError::config_validation(
            "stream.clock_rate",
            format!(
                "clock_rate ({}) must be a non-zero multiple of fps ({})",
                stream.clock_rate, stream.fps
            ),
        ));
    }

    Ok(())
}

fn validate_telemetry(config: &RelayConfig) -> Result<(), ContractError> {
    let telemetry = &config.telemetry;
    if !telemetry.enabled {
        return Ok(());
    }

    if telemetry.host.trim().is_empty() {
        return Err(ContractError::config_validation(
            "telemetry.host",
            "host cannot be empty when telemetry is enabled",
        ));
    }

    if telemetry.port == 0 {
        return Err(ContractError::config_validation(
            "telemetry.port",
            "port must be > 0",
        ));
    }

    Ok(())
}

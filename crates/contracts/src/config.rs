//! RelayConfig - Config Loader output
//!
//! Server bind address, camera output shape, stream cadence and telemetry target.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::{Calibration, TimeBase};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete relay configuration
///
/// Every section is optional in the file; missing sections take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Camera settings
    #[serde(default)]
    pub camera: CameraConfig,

    /// Output cadence
    #[serde(default)]
    pub stream: StreamConfig,

    /// Pose telemetry forwarding
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Directory served at `/` (viewer page)
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Allow cross-origin requests
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: None,
            cors: true,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_true() -> bool {
    true
}

/// Camera source selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraKind {
    /// Hardware-free moving-bar generator
    #[default]
    Synthetic,
    /// No camera; the server runs without video
    Disabled,
}

/// Camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera source
    #[serde(default)]
    pub kind: CameraKind,

    /// Output width after resize
    #[serde(default = "default_width")]
    pub width: u32,

    /// Output height after resize
    #[serde(default = "default_height")]
    pub height: u32,

    /// Native sensor width (synthetic camera)
    #[serde(default = "default_width")]
    pub sensor_width: u32,

    /// Native sensor height (synthetic camera)
    #[serde(default = "default_height")]
    pub sensor_height: u32,

    /// Calibration reported by the synthetic camera
    #[serde(default)]
    pub calibration: Option<Calibration>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            kind: CameraKind::default(),
            width: default_width(),
            height: default_height(),
            sensor_width: default_width(),
            sensor_height: default_height(),
            calibration: None,
        }
    }
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

/// Output cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Frames per second each eye targets
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Presentation clock rate (ticks per second)
    #[serde(default = "default_clock_rate")]
    pub clock_rate: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            clock_rate: default_clock_rate(),
        }
    }
}

fn default_fps() -> u32 {
    30
}

fn default_clock_rate() -> u32 {
    90_000
}

impl StreamConfig {
    /// Wall-clock spacing between frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    /// Ticks the shared timestamp advances per stereo cycle
    pub fn pts_step(&self) -> u64 {
        (self.clock_rate / self.fps.max(1)) as u64
    }

    pub fn time_base(&self) -> TimeBase {
        TimeBase {
            num: 1,
            den: self.clock_rate,
        }
    }
}

/// Pose telemetry forwarding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Try to connect at startup
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Actuator controller host
    #[serde(default = "default_telemetry_host")]
    pub host: String,

    /// Actuator controller port
    #[serde(default = "default_telemetry_port")]
    pub port: u16,

    /// Give up connecting after this long
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_telemetry_host(),
            port: default_telemetry_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl TelemetryConfig {
    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_telemetry_host() -> String {
    "127.0.0.1".to_string()
}

fn default_telemetry_port() -> u16 {
    9090
}

fn default_connect_timeout_ms() -> u64 {
    2000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_defaults() {
        let stream = StreamConfig::default();
        assert_eq!(stream.pts_step(), 3000);
        assert_eq!(stream.time_base(), TimeBase::VIDEO_90K);
        let interval = stream.frame_interval();
        assert!((interval.as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_json_takes_defaults() {
        let config: RelayConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.camera.width, 1280);
        assert_eq!(config.camera.kind, CameraKind::Synthetic);
        assert_eq!(config.telemetry.address(), "127.0.0.1:9090");
    }
}

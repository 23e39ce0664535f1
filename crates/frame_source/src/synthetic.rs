//! Synthetic stereo camera
//!
//! Hardware-free `StereoDevice` producing mono frames with a bright vertical bar
//! sweeping across a gradient. The right eye sees the bar shifted by a fixed
//! disparity, so the pair is visibly stereo when viewed.

use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::{Calibration, CameraConfig, ContractError, ImageData, PixelFormat};
use tracing::{debug, trace};

use crate::device::StereoDevice;

const BAR_WIDTH: u32 = 24;
const BAR_STEP: u32 = 8;
const DISPARITY_PX: u32 = 16;

/// Synthetic camera configuration
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Native sensor width
    pub width: u32,
    /// Native sensor height
    pub height: u32,
    /// Minimum spacing between captures (None = capture immediately)
    pub frame_period: Option<Duration>,
    /// Reported calibration (None = derived from the sensor size)
    pub calibration: Option<Calibration>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            frame_period: None,
            calibration: None,
        }
    }
}

impl SyntheticConfig {
    pub fn from_camera_config(config: &CameraConfig) -> Self {
        Self {
            width: config.sensor_width,
            height: config.sensor_height,
            frame_period: None,
            calibration: config.calibration.clone(),
        }
    }
}

/// Synthetic stereo camera
pub struct SyntheticCamera {
    config: SyntheticConfig,
    frame_id: u64,
    last_capture: Option<Instant>,
    closed: bool,
}

impl SyntheticCamera {
    /// Create a synthetic camera
    ///
    /// # Errors
    /// Zero-sized sensor.
    pub fn new(config: SyntheticConfig) -> Result<Self, ContractError> {
        if config.width == 0 || config.height == 0 {
            return Err(ContractError::camera_unavailable(format!(
                "invalid synthetic sensor size {}x{}",
                config.width, config.height
            )));
        }
        debug!(
            width = config.width,
            height = config.height,
            "synthetic stereo camera opened"
        );
        Ok(Self {
            config,
            frame_id: 0,
            last_capture: None,
            closed: false,
        })
    }

    fn render(&self, bar_x: u32) -> ImageData {
        let (w, h) = (self.config.width, self.config.height);
        let mut data = Vec::with_capacity((w * h) as usize);
        for _ in 0..h {
            for x in 0..w {
                let in_bar = x >= bar_x && x < bar_x + BAR_WIDTH;
                let value = if in_bar { 255 } else { (x * 160 / w) as u8 + 32 };
                data.push(value);
            }
        }
        ImageData {
            width: w,
            height: h,
            format: PixelFormat::Gray8,
            data: Bytes::from(data),
        }
    }

    fn pace(&mut self) {
        if let (Some(period), Some(last)) = (self.config.frame_period, self.last_capture) {
            let elapsed = last.elapsed();
            if elapsed < period {
                thread::sleep(period - elapsed);
            }
        }
        self.last_capture = Some(Instant::now());
    }

    fn default_calibration(&self) -> Calibration {
        let w = self.config.width as f64;
        let h = self.config.height as f64;
        let f = w * 0.625;
        let k = [[f, 0.0, w / 2.0], [0.0, f, h / 2.0], [0.0, 0.0, 1.0]];
        Calibration {
            k_left: k,
            k_right: k,
            baseline_m: 0.075,
        }
    }
}

impl StereoDevice for SyntheticCamera {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn capture(&mut self) -> Result<(ImageData, ImageData), ContractError> {
        if self.closed {
            return Err(ContractError::camera_unavailable("synthetic camera closed"));
        }
        self.pace();

        self.frame_id += 1;
        let span = self.config.width.saturating_sub(BAR_WIDTH + DISPARITY_PX).max(1);
        let left_x = ((self.frame_id * BAR_STEP as u64) % span as u64) as u32 + DISPARITY_PX;
        let right_x = left_x - DISPARITY_PX;

        trace!(frame_id = self.frame_id, bar_x = left_x, "synthetic capture");
        Ok((self.render(left_x), self.render(right_x)))
    }

    fn calibration(&self) -> Result<Calibration, ContractError> {
        Ok(self
            .config
            .calibration
            .clone()
            .unwrap_or_else(|| self.default_calibration()))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> SyntheticCamera {
        SyntheticCamera::new(SyntheticConfig {
            width: 320,
            height: 240,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_capture_shape() {
        let mut cam = camera();
        let (left, right) = cam.capture().unwrap();
        assert_eq!(left.dimensions(), (320, 240));
        assert_eq!(left.format, PixelFormat::Gray8);
        assert!(left.check_shape().is_ok());
        assert!(right.check_shape().is_ok());
    }

    #[test]
    fn test_eyes_differ_by_disparity() {
        let mut cam = camera();
        let (left, right) = cam.capture().unwrap();
        assert_ne!(left.data, right.data);
    }

    #[test]
    fn test_bar_moves_between_captures() {
        let mut cam = camera();
        let (first, _) = cam.capture().unwrap();
        let (second, _) = cam.capture().unwrap();
        assert_ne!(first.data, second.data);
    }

    #[test]
    fn test_closed_camera_fails() {
        let mut cam = camera();
        cam.close();
        assert!(cam.capture().is_err());
    }

    #[test]
    fn test_configured_calibration_wins() {
        let calib = Calibration {
            k_left: [[800.0, 0.0, 640.0], [0.0, 800.0, 360.0], [0.0, 0.0, 1.0]],
            k_right: [[801.0, 0.0, 635.0], [0.0, 801.0, 361.0], [0.0, 0.0, 1.0]],
            baseline_m: 0.075,
        };
        let cam = SyntheticCamera::new(SyntheticConfig {
            calibration: Some(calib.clone()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(cam.calibration().unwrap(), calib);
    }

    #[test]
    fn test_zero_size_rejected() {
        let result = SyntheticCamera::new(SyntheticConfig {
            width: 0,
            ..Default::default()
        });
        assert!(result.is_err());
    }
}

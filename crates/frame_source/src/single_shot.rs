//! SingleShot - memoizing FrameSource over a blocking StereoDevice
//!
//! The first `fetch_pair` of a cycle captures; later calls return the same pair
//! until `invalidate_single_shot_cache`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use contracts::{Calibration, ContractError, FrameSource, ImageData};
use tracing::{debug, info, instrument};

use crate::device::StereoDevice;
use crate::normalize::normalize;

type RawPair = (ImageData, ImageData);

/// Single-shot cached stereo source
pub struct SingleShot<D: StereoDevice> {
    name: String,
    device: Arc<Mutex<D>>,
    cached: Mutex<Option<RawPair>>,
    output_width: u32,
    output_height: u32,
    stopped: AtomicBool,
    captures: AtomicU64,
}

impl<D: StereoDevice> SingleShot<D> {
    /// Wrap `device`, resizing every frame to `output_width` × `output_height`
    pub fn new(device: D, output_width: u32, output_height: u32) -> Self {
        let name = device.name().to_string();
        info!(
            source = %name,
            width = output_width,
            height = output_height,
            "stereo source initialized"
        );
        Self {
            name,
            device: Arc::new(Mutex::new(device)),
            cached: Mutex::new(None),
            output_width,
            output_height,
            stopped: AtomicBool::new(false),
            captures: AtomicU64::new(0),
        }
    }

    /// Configured output size
    pub fn output_size(&self) -> (u32, u32) {
        (self.output_width, self.output_height)
    }

    /// Number of real device captures performed
    pub fn capture_count(&self) -> u64 {
        self.captures.load(Ordering::Relaxed)
    }

    fn cached_pair(&self) -> Option<RawPair> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, pair: &RawPair) {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Some(pair.clone());
    }

    fn ensure_running(&self) -> Result<(), ContractError> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(ContractError::camera_unavailable(format!(
                "source '{}' has been stopped",
                self.name
            )));
        }
        Ok(())
    }
}

impl<D: StereoDevice> FrameSource for SingleShot<D> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "single_shot_fetch", level = "trace", skip(self), fields(source = %self.name))]
    async fn fetch_pair(&self) -> Result<(ImageData, ImageData), ContractError> {
        self.ensure_running()?;

        if let Some(pair) = self.cached_pair() {
            return Ok(pair);
        }

        let device = Arc::clone(&self.device);
        let (width, height) = (self.output_width, self.output_height);
        let pair = tokio::task::spawn_blocking(move || {
            let mut device = device.lock().unwrap_or_else(PoisonError::into_inner);
            let (left, right) = device.capture()?;
            Ok::<_, ContractError>((normalize(left, width, height)?, normalize(right, width, height)?))
        })
        .await
        .map_err(|e| ContractError::capture(format!("capture task failed: {e}")))??;

        self.store(&pair);
        let n = self.captures.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::counter!("stereo_device_captures_total").increment(1);
        debug!(source = %self.name, capture = n, "captured stereo pair");
        Ok(pair)
    }

    fn invalidate_single_shot_cache(&self) {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    async fn calibration(&self) -> Result<Calibration, ContractError> {
        self.ensure_running()?;
        let device = Arc::clone(&self.device);
        tokio::task::spawn_blocking(move || {
            device
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .calibration()
        })
        .await
        .map_err(|e| ContractError::Calibration {
            message: format!("calibration task failed: {e}"),
        })?
    }

    fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.invalidate_single_shot_cache();
        self.device
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .close();
        info!(source = %self.name, "stereo source stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::PixelFormat;

    /// Device returning a new pair of constant frames on every capture
    struct CountingDevice {
        next: u8,
        closed: bool,
    }

    impl StereoDevice for CountingDevice {
        fn name(&self) -> &str {
            "counting"
        }

        fn capture(&mut self) -> Result<(ImageData, ImageData), ContractError> {
            if self.closed {
                return Err(ContractError::capture("closed"));
            }
            self.next += 1;
            Ok((
                ImageData::filled(1280, 720, PixelFormat::Gray8, self.next),
                ImageData::filled(1280, 720, PixelFormat::Gray8, self.next + 100),
            ))
        }

        fn calibration(&self) -> Result<Calibration, ContractError> {
            Err(ContractError::Calibration {
                message: "not stored on device".into(),
            })
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    fn source(width: u32, height: u32) -> SingleShot<CountingDevice> {
        SingleShot::new(CountingDevice { next: 0, closed: false }, width, height)
    }

    #[tokio::test]
    async fn test_converts_and_resizes() {
        let source = source(640, 360);
        let (left, right) = source.fetch_pair().await.unwrap();

        assert_eq!(left.dimensions(), (640, 360));
        assert_eq!(right.dimensions(), (640, 360));
        assert_eq!(left.format, PixelFormat::Rgb8);
        assert_eq!(right.data.len(), 640 * 360 * 3);
    }

    #[tokio::test]
    async fn test_repeated_fetch_reuses_pair() {
        let source = source(1280, 720);
        let first = source.fetch_pair().await.unwrap();
        let second = source.fetch_pair().await.unwrap();

        assert_eq!(source.capture_count(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_capture() {
        let source = source(1280, 720);
        let (l1, r1) = source.fetch_pair().await.unwrap();
        source.invalidate_single_shot_cache();
        let (l2, r2) = source.fetch_pair().await.unwrap();

        assert_eq!(source.capture_count(), 2);
        assert_ne!(l1.data, l2.data);
        assert_ne!(r1.data, r2.data);
    }

    #[tokio::test]
    async fn test_stopped_source_is_unavailable() {
        let source = source(1280, 720);
        source.stop();
        let result = source.fetch_pair().await;
        assert!(matches!(result, Err(ContractError::CameraUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_calibration_error_propagates() {
        let source = source(1280, 720);
        assert!(matches!(
            source.calibration().await,
            Err(ContractError::Calibration { .. })
        ));
    }
}

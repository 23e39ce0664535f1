//! Mock stereo source
//!
//! Async `FrameSource` with injectable capture delay and failures, used for
//! testing the sync engine without a device.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use contracts::{Calibration, ContractError, FrameSource, ImageData, PixelFormat};
use tracing::trace;

/// Pixel content of mock captures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockPattern {
    /// Every capture returns left = `left`, right = `right`
    Constant { left: u8, right: u8 },
    /// Capture n fills both eyes with `n % 256` (detects torn pairs)
    Counting,
}

/// Mock stereo source
pub struct MockStereoSource {
    width: u32,
    height: u32,
    format: PixelFormat,
    pattern: MockPattern,
    delay: Mutex<Option<Duration>>,
    calibration: Option<Calibration>,
    cached: Mutex<Option<(ImageData, ImageData)>>,
    fail_next: AtomicBool,
    stopped: AtomicBool,
    fetches: AtomicU64,
    captures: AtomicU64,
    invalidations: AtomicU64,
}

impl MockStereoSource {
    /// Create a mock producing `width` × `height` RGB frames
    pub fn new(width: u32, height: u32, pattern: MockPattern) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgb8,
            pattern,
            delay: Mutex::new(None),
            calibration: None,
            cached: Mutex::new(None),
            fail_next: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            fetches: AtomicU64::new(0),
            captures: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// Constant left/right frames
    pub fn constant(width: u32, height: u32, left: u8, right: u8) -> Self {
        Self::new(width, height, MockPattern::Constant { left, right })
    }

    /// Frames numbered by capture
    pub fn counting(width: u32, height: u32) -> Self {
        Self::new(width, height, MockPattern::Counting)
    }

    /// Report this calibration
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Sleep this long inside every real capture
    pub fn with_delay(self, delay: Duration) -> Self {
        self.set_delay(Some(delay));
        self
    }

    /// Change the capture delay
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Make the next real capture fail
    pub fn fail_next_capture(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// `fetch_pair` calls, cached or not
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Real captures performed
    pub fn capture_count(&self) -> u64 {
        self.captures.load(Ordering::SeqCst)
    }

    /// `invalidate_single_shot_cache` calls
    pub fn invalidate_count(&self) -> u64 {
        self.invalidations.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn render(&self, capture: u64) -> (ImageData, ImageData) {
        let (left, right) = match self.pattern {
            MockPattern::Constant { left, right } => (left, right),
            MockPattern::Counting => {
                let v = (capture % 256) as u8;
                (v, v)
            }
        };
        (
            ImageData::filled(self.width, self.height, self.format, left),
            ImageData::filled(self.width, self.height, self.format, right),
        )
    }
}

impl FrameSource for MockStereoSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_pair(&self) -> Result<(ImageData, ImageData), ContractError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.is_stopped() {
            return Err(ContractError::camera_unavailable("mock source stopped"));
        }

        let cached = self
            .cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(pair) = cached {
            return Ok(pair);
        }

        let delay = *self.delay.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ContractError::capture("injected capture failure"));
        }

        let n = self.captures.fetch_add(1, Ordering::SeqCst) + 1;
        let pair = self.render(n);
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Some(pair.clone());
        trace!(capture = n, "mock capture");
        Ok(pair)
    }

    fn invalidate_single_shot_cache(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    async fn calibration(&self) -> Result<Calibration, ContractError> {
        self.calibration.clone().ok_or_else(|| ContractError::Calibration {
            message: "mock source has no calibration".into(),
        })
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_single_shot_semantics() {
        let source = MockStereoSource::counting(4, 4);
        let a = source.fetch_pair().await.unwrap();
        let b = source.fetch_pair().await.unwrap();
        assert_eq!(a, b);
        assert_eq!(source.capture_count(), 1);

        source.invalidate_single_shot_cache();
        let c = source.fetch_pair().await.unwrap();
        assert_ne!(a, c);
        assert_eq!(c.0.data[0], 2);
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let source = MockStereoSource::constant(2, 2, 1, 2);
        source.fail_next_capture();
        assert!(matches!(
            source.fetch_pair().await,
            Err(ContractError::Capture { .. })
        ));
        assert!(source.fetch_pair().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_uses_tokio_clock() {
        let source = MockStereoSource::constant(2, 2, 1, 2).with_delay(Duration::from_millis(50));
        let start = tokio::time::Instant::now();
        source.fetch_pair().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}

//! Read-only calibration access.

use std::sync::Arc;

use contracts::{Calibration, FrameSource};
use tokio::sync::OnceCell;
use tracing::warn;

/// Result of a calibration lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationStatus {
    Available(Calibration),
    /// No camera, or the device could not report its calibration
    Unavailable { reason: String },
}

/// Memoized calibration snapshot
///
/// The first successful read from the source is kept for the life of the process;
/// failures are not cached.
pub struct CalibrationAccessor<S> {
    source: Option<Arc<S>>,
    snapshot: OnceCell<Calibration>,
}

impl<S: FrameSource + Send + Sync> CalibrationAccessor<S> {
    /// `None` means the camera failed to initialize
    pub fn new(source: Option<Arc<S>>) -> Self {
        Self {
            source,
            snapshot: OnceCell::new(),
        }
    }

    pub async fn get_calibration(&self) -> CalibrationStatus {
        let Some(source) = self.source.as_ref() else {
            return CalibrationStatus::Unavailable {
                reason: "camera not initialized".to_string(),
            };
        };

        match self
            .snapshot
            .get_or_try_init(|| source.calibration())
            .await
        {
            Ok(calibration) => CalibrationStatus::Available(calibration.clone()),
            Err(e) => {
                warn!(error = %e, "calibration unavailable");
                CalibrationStatus::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_source::MockStereoSource;

    fn calib() -> Calibration {
        Calibration {
            k_left: [[800.0, 0.0, 640.0], [0.0, 800.0, 360.0], [0.0, 0.0, 1.0]],
            k_right: [[801.0, 0.0, 635.0], [0.0, 801.0, 361.0], [0.0, 0.0, 1.0]],
            baseline_m: 0.075,
        }
    }

    #[tokio::test]
    async fn test_returns_calibration_unchanged() {
        let source = Arc::new(MockStereoSource::counting(2, 2).with_calibration(calib()));
        let accessor = CalibrationAccessor::new(Some(source));
        assert_eq!(
            accessor.get_calibration().await,
            CalibrationStatus::Available(calib())
        );
    }

    #[tokio::test]
    async fn test_snapshot_survives_source_stop() {
        let source = Arc::new(MockStereoSource::counting(2, 2).with_calibration(calib()));
        let accessor = CalibrationAccessor::new(Some(source.clone()));
        accessor.get_calibration().await;
        source.stop();
        assert!(matches!(
            accessor.get_calibration().await,
            CalibrationStatus::Available(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_source_is_unavailable() {
        let accessor = CalibrationAccessor::<MockStereoSource>::new(None);
        assert!(matches!(
            accessor.get_calibration().await,
            CalibrationStatus::Unavailable { .. }
        ));
    }

    #[tokio::test]
    async fn test_source_error_is_unavailable() {
        let source = Arc::new(MockStereoSource::counting(2, 2));
        let accessor = CalibrationAccessor::new(Some(source));
        match accessor.get_calibration().await {
            CalibrationStatus::Unavailable { reason } => assert!(reason.contains("calibration")),
            other => panic!("expected unavailable, got {other:?}"),
        }
    }
}

//! # Frame Source
//!
//! Stereo camera sources.
//!
//! Responsibilities:
//! - Wrap a blocking stereo device behind the async `FrameSource` contract
//! - Single-shot memoization of one captured pair per cycle
//! - Normalize captured frames (mono → RGB, resize to output size)
//! - Provide hardware-free `SyntheticCamera` and test `MockStereoSource`

pub mod device;
pub mod mock;
pub mod normalize;
pub mod single_shot;
pub mod synthetic;

pub use contracts::FrameSource;
pub use device::StereoDevice;
pub use mock::{MockPattern, MockStereoSource};
pub use single_shot::SingleShot;
pub use synthetic::{SyntheticCamera, SyntheticConfig};

use contracts::{CameraConfig, CameraKind, ContractError};
use tracing::info;

/// Frame source used by the server: any boxed device behind the single-shot cache
pub type CameraSource = SingleShot<Box<dyn StereoDevice>>;

/// Open the camera described by `config`
///
/// Returns `Ok(None)` when the camera is disabled.
///
/// # Errors
/// Device initialization failure. Callers are expected to continue without video.
pub fn open_camera(config: &CameraConfig) -> Result<Option<CameraSource>, ContractError> {
    match config.kind {
        CameraKind::Disabled => {
            info!("camera disabled by configuration");
            Ok(None)
        }
        CameraKind::Synthetic => {
            let device = SyntheticCamera::new(SyntheticConfig::from_camera_config(config))?;
            let boxed: Box<dyn StereoDevice> = Box::new(device);
            Ok(Some(SingleShot::new(boxed, config.width, config.height)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_disabled_camera() {
        let config = CameraConfig {
            kind: CameraKind::Disabled,
            ..Default::default()
        };
        assert!(open_camera(&config).unwrap().is_none());
    }

    #[test]
    fn test_open_synthetic_camera() {
        let source = open_camera(&CameraConfig::default()).unwrap().unwrap();
        assert_eq!(source.output_size(), (1280, 720));
    }
}

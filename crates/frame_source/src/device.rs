//! StereoDevice - blocking driver-level capture interface
//!
//! A device delivers raw, already rectified and synchronized frames in its native
//! resolution and format. Normalization and memoization happen in `SingleShot`.

use contracts::{Calibration, ContractError, ImageData};

/// Blocking stereo device
///
/// Calls may block the current thread; `SingleShot` runs them on the blocking pool.
pub trait StereoDevice: Send + 'static {
    /// Device name (used for logging)
    fn name(&self) -> &str;

    /// Block until the next synchronized left/right pair is available
    fn capture(&mut self) -> Result<(ImageData, ImageData), ContractError>;

    /// Read the factory calibration
    fn calibration(&self) -> Result<Calibration, ContractError>;

    /// Release the device; later captures fail
    fn close(&mut self);
}

impl StereoDevice for Box<dyn StereoDevice> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn capture(&mut self) -> Result<(ImageData, ImageData), ContractError> {
        (**self).capture()
    }

    fn calibration(&self) -> Result<Calibration, ContractError> {
        (**self).calibration()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

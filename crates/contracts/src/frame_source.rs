//! FrameSource trait - stereo camera abstraction
//!
//! The camera driver, its pipeline configuration and rectification are external.
//! This trait is the only surface the sync engine sees.

use crate::{Calibration, ContractError, ImageData};

/// Stereo frame source
///
/// Implementations keep a single-shot cache: repeated `fetch_pair` calls within one
/// capture cycle return the same pair until `invalidate_single_shot_cache` is called.
///
/// # Example
///
/// ```ignore
/// source.invalidate_single_shot_cache();
/// let (left, right) = source.fetch_pair().await?;
/// ```
#[trait_variant::make(FrameSource: Send)]
pub trait LocalFrameSource {
    /// Source name (used for logging)
    fn name(&self) -> &str;

    /// Fetch the most recent synchronized, rectified pair
    ///
    /// Images are already resized to the configured output resolution.
    ///
    /// # Errors
    /// Returns a capture error if the device fails; callers must not retry within the cycle.
    async fn fetch_pair(&self) -> Result<(ImageData, ImageData), ContractError>;

    /// Force the next `fetch_pair` to capture instead of reusing the memoized pair
    fn invalidate_single_shot_cache(&self);

    /// Read the stereo calibration from the device
    async fn calibration(&self) -> Result<Calibration, ContractError>;

    /// Release the device
    fn stop(&self);
}

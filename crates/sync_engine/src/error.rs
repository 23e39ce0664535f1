//! Emitter error types

use contracts::ContractError;
use thiserror::Error;

/// Fatal errors of one emission cycle
///
/// "No pair captured yet" is not an error; the follower substitutes a placeholder.
#[derive(Debug, Error)]
pub enum EmitterError {
    /// FrameSource fetch failed
    #[error("capture failed: {0}")]
    Capture(#[source] ContractError),

    /// Captured frame could not be converted to the transport layout
    #[error("frame conversion failed: {0}")]
    Conversion(#[source] ContractError),
}

impl From<EmitterError> for ContractError {
    fn from(err: EmitterError) -> Self {
        match err {
            EmitterError::Capture(inner) | EmitterError::Conversion(inner) => inner,
        }
    }
}

//! TransportTrack trait - pull interface fed to the video transport
//!
//! The transport library calls `produce_next_frame` at its own cadence, one call per frame.

use crate::{ContractError, Eye, VideoFrame};

/// Per-eye video track
#[trait_variant::make(TransportTrack: Send)]
pub trait LocalTransportTrack {
    /// Eye served by this track
    fn eye(&self) -> Eye;

    /// Produce the next frame for the transport
    ///
    /// # Errors
    /// An error means the track cannot continue; the transport should end this eye's
    /// stream rather than repeat stale data.
    async fn produce_next_frame(&mut self) -> Result<VideoFrame, ContractError>;
}

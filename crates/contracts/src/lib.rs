//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Presentation timestamps are integer ticks of a fixed clock (`TimeBase`, 90 kHz)
//! - Both eyes of one stereo pair always carry the same `pts`

mod calibration;
mod config;
mod error;
mod frame_source;
mod image;
mod stereo;
mod track;

pub use calibration::*;
pub use config::*;
pub use error::*;
pub use frame_source::{FrameSource, LocalFrameSource};
pub use image::*;
pub use stereo::*;
pub use track::{LocalTransportTrack, TransportTrack};

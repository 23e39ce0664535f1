//! Stereo pair and per-eye frame types.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ImageData;

/// Which eye a track serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub fn as_str(self) -> &'static str {
        match self {
            Eye::Left => "left",
            Eye::Right => "right",
        }
    }
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitter role
///
/// The leader triggers capture and advances the shared timestamp; the follower only reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeRole {
    Leader,
    Follower,
}

/// Rational time base of presentation timestamps (`num / den` seconds per tick)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBase {
    pub num: u32,
    pub den: u32,
}

impl TimeBase {
    /// 90 kHz RTP video clock
    pub const VIDEO_90K: TimeBase = TimeBase { num: 1, den: 90_000 };

    /// Ticks per second
    pub fn clock_rate(self) -> u32 {
        self.den / self.num.max(1)
    }

    /// Convert a tick count to seconds
    pub fn ticks_to_secs(self, ticks: u64) -> f64 {
        ticks as f64 * self.num as f64 / self.den as f64
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::VIDEO_90K
    }
}

impl fmt::Display for TimeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// One left + one right image captured together
///
/// Both images always come from a single `FrameSource::fetch_pair` call.
/// Stored behind an `Arc` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StereoPair {
    pub left: ImageData,
    pub right: ImageData,
    /// Presentation timestamp shared by both eyes
    pub pts: u64,
    pub time_base: TimeBase,
}

impl StereoPair {
    /// Image for the given eye
    pub fn image(&self, eye: Eye) -> &ImageData {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }
}

/// Shared handle to an immutable pair
pub type SharedPair = Arc<StereoPair>;

/// Frame handed to the video transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub eye: Eye,
    pub image: ImageData,
    pub pts: u64,
    pub time_base: TimeBase,
    /// True when no pair had been captured yet and a black frame was substituted
    pub placeholder: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_base_90k() {
        let tb = TimeBase::VIDEO_90K;
        assert_eq!(tb.clock_rate(), 90_000);
        assert_eq!(tb.to_string(), "1/90000");
        assert!((tb.ticks_to_secs(3000) - 1.0 / 30.0).abs() < 1e-12);
    }
}

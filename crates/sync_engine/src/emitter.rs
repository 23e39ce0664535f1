//! Per-eye paced emitter.

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    ContractError, Eye, EyeRole, FrameSource, ImageData, StereoPair, StreamConfig, TimeBase,
    TransportTrack, VideoFrame,
};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, instrument, trace};

use crate::cache::PairCache;
use crate::color::{placeholder, to_bgr};
use crate::error::EmitterError;

/// Cadence and output shape shared by both eyes of a session
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Wall-clock spacing between frames
    pub frame_interval: Duration,
    /// Ticks the shared timestamp advances per leader cycle
    pub pts_step: u64,
    pub time_base: TimeBase,
    /// Placeholder width
    pub width: u32,
    /// Placeholder height
    pub height: u32,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self::from_stream(&StreamConfig::default(), 1280, 720)
    }
}

impl EmitterConfig {
    pub fn from_stream(stream: &StreamConfig, width: u32, height: u32) -> Self {
        Self {
            frame_interval: stream.frame_interval(),
            pts_step: stream.pts_step(),
            time_base: stream.time_base(),
            width,
            height,
        }
    }
}

/// Emitter state
#[derive(Debug, Clone, Copy)]
enum EmitterState {
    /// `next_frame` never called
    Unstarted,
    /// Cadence anchored at `reference`
    Running { reference: Instant, emitted: u64 },
}

/// Paced per-eye frame emitter
///
/// The leader invalidates the source's single-shot cache, captures, converts and
/// stores a new pair and advances the shared timestamp. The follower only reads.
pub struct PacedEmitter<S> {
    session: u64,
    eye: Eye,
    role: EyeRole,
    source: Arc<S>,
    cache: Arc<PairCache>,
    config: EmitterConfig,
    state: EmitterState,
    blank: Option<ImageData>,
}

impl<S> PacedEmitter<S>
where
    S: FrameSource + Send + Sync,
{
    pub fn new(
        session: u64,
        eye: Eye,
        role: EyeRole,
        source: Arc<S>,
        cache: Arc<PairCache>,
        config: EmitterConfig,
    ) -> Self {
        Self {
            session,
            eye,
            role,
            source,
            cache,
            config,
            state: EmitterState::Unstarted,
            blank: None,
        }
    }

    pub fn eye(&self) -> Eye {
        self.eye
    }

    pub fn role(&self) -> EyeRole {
        self.role
    }

    /// Frames emitted so far
    pub fn emitted(&self) -> u64 {
        match self.state {
            EmitterState::Unstarted => 0,
            EmitterState::Running { emitted, .. } => emitted,
        }
    }

    /// Produce the next frame for this eye
    ///
    /// Sleeps until `reference + n × frame_interval`, where `reference` is the
    /// instant of the first call. Late frames are emitted immediately, never skipped.
    ///
    /// # Errors
    /// Capture or conversion failure on a leader cycle. Not retried.
    #[instrument(
        name = "emitter_next_frame",
        level = "trace",
        skip(self),
        fields(session = self.session, eye = %self.eye)
    )]
    pub async fn next_frame(&mut self) -> Result<VideoFrame, EmitterError> {
        let target = self.schedule_next();
        sleep_until(target).await;

        let lag = Instant::now().saturating_duration_since(target);
        metrics::histogram!("stereo_cadence_lag_ms", "eye" => self.eye.as_str())
            .record(lag.as_secs_f64() * 1000.0);

        let frame = match self.role {
            EyeRole::Leader => self.capture_cycle().await?,
            EyeRole::Follower => self.read_cycle().await,
        };

        metrics::counter!("stereo_frames_emitted_total", "eye" => self.eye.as_str()).increment(1);
        trace!(pts = frame.pts, placeholder = frame.placeholder, "frame emitted");
        Ok(frame)
    }

    /// Advance the emission counter and return the target instant
    fn schedule_next(&mut self) -> Instant {
        let (reference, emitted) = match self.state {
            EmitterState::Unstarted => {
                info!(
                    session = self.session,
                    eye = %self.eye,
                    role = ?self.role,
                    "stream started"
                );
                (Instant::now(), 1)
            }
            EmitterState::Running { reference, emitted } => (reference, emitted + 1),
        };
        self.state = EmitterState::Running { reference, emitted };

        // scaled from the reference each time so rounding never accumulates
        reference + self.config.frame_interval.mul_f64(emitted as f64)
    }

    /// Leader: capture, convert and store a fresh pair under the cache lock
    async fn capture_cycle(&self) -> Result<VideoFrame, EmitterError> {
        let mut cache = self.cache.lock().await;

        self.source.invalidate_single_shot_cache();
        let started = Instant::now();
        let (left, right) = self.source.fetch_pair().await.map_err(|e| {
            metrics::counter!("stereo_capture_errors_total").increment(1);
            error!(session = self.session, eye = %self.eye, error = %e, "stereo capture failed");
            EmitterError::Capture(e)
        })?;
        metrics::histogram!("stereo_capture_latency_ms")
            .record(started.elapsed().as_secs_f64() * 1000.0);

        let left = to_bgr(left).map_err(EmitterError::Conversion)?;
        let right = to_bgr(right).map_err(EmitterError::Conversion)?;

        let pts = cache.advance_pts(self.config.pts_step);
        let pair = cache.refresh(StereoPair {
            left,
            right,
            pts,
            time_base: self.config.time_base,
        });
        drop(cache);

        metrics::gauge!("stereo_pts").set(pts as f64);
        Ok(self.tag(pair.image(self.eye).clone(), pts, false))
    }

    /// Follower: read whatever the leader stored last
    async fn read_cycle(&mut self) -> VideoFrame {
        let (pair, pts) = {
            let cache = self.cache.lock().await;
            (cache.read(), cache.pts())
        };

        match pair {
            Some(pair) => self.tag(pair.image(self.eye).clone(), pts, false),
            None => {
                metrics::counter!("stereo_placeholder_frames_total", "eye" => self.eye.as_str())
                    .increment(1);
                debug!(
                    session = self.session,
                    eye = %self.eye,
                    "no stereo pair yet, sending placeholder"
                );
                let blank = self.blank_frame();
                self.tag(blank, pts, true)
            }
        }
    }

    fn blank_frame(&mut self) -> ImageData {
        let (width, height) = (self.config.width, self.config.height);
        self.blank
            .get_or_insert_with(|| placeholder(width, height))
            .clone()
    }

    fn tag(&self, image: ImageData, pts: u64, placeholder: bool) -> VideoFrame {
        VideoFrame {
            eye: self.eye,
            image,
            pts,
            time_base: self.config.time_base,
            placeholder,
        }
    }
}

impl<S> TransportTrack for PacedEmitter<S>
where
    S: FrameSource + Send + Sync,
{
    fn eye(&self) -> Eye {
        self.eye
    }

    async fn produce_next_frame(&mut self) -> Result<VideoFrame, ContractError> {
        self.next_frame().await.map_err(ContractError::from)
    }
}

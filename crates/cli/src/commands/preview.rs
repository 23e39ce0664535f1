//! `preview` command implementation.
//!
//! Runs one local viewer session against the configured camera, pulling both
//! eyes concurrently the way a transport would, and reports pacing statistics.

use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::{FrameSource, VideoFrame};
use observability::{PacingStatsAggregator, PacingSummary};
use serde::Serialize;
use sync_engine::{EmitterConfig, PacedEmitter, StereoSession};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use super::load_config;
use crate::cli::PreviewArgs;
use crate::error::CliError;

/// Preview report for JSON output
#[derive(Debug, Serialize)]
struct PreviewReport {
    fps: u32,
    frames_per_eye: u64,
    duration_secs: f64,
    left_frames: u64,
    right_frames: u64,
    placeholder_frames: u64,
    mean_interval_ms: f64,
    max_interval_ms: f64,
    eye_alignment_pct: f64,
    final_pts: u64,
    time_base: String,
    captures: u64,
}

/// Execute the `preview` command
pub async fn run_preview(args: &PreviewArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(fps) = args.fps {
        config.stream.fps = fps;
    }
    config_loader::ConfigLoader::validate(&config)?;

    let camera = frame_source::open_camera(&config.camera)
        .context("Failed to open camera")?
        .ok_or_else(|| CliError::camera_unavailable("camera disabled by configuration"))?;
    let camera = Arc::new(camera);

    let emitter_config =
        EmitterConfig::from_stream(&config.stream, config.camera.width, config.camera.height);
    let session = StereoSession::new(1, Arc::clone(&camera), emitter_config);
    observability::record_session_started(session.id());

    info!(
        frames = args.frames,
        fps = config.stream.fps,
        source = %camera.name(),
        "Starting preview session"
    );

    let stats = Arc::new(Mutex::new(PacingStatsAggregator::new()));
    let started = Instant::now();
    let (left, right) = session.into_tracks();

    let left_task = tokio::spawn(pull_frames(left, args.frames, started, Arc::clone(&stats)));
    let right_task = tokio::spawn(pull_frames(right, args.frames, started, Arc::clone(&stats)));
    let (left_result, right_result) = tokio::join!(left_task, right_task);
    let duration = started.elapsed();

    camera.stop();

    let left_emitted = left_result.context("Left eye task panicked")??;
    right_result.context("Right eye task panicked")??;
    observability::record_session_ended(left_emitted);

    let summary = stats.lock().await.summary();
    if args.json {
        let report = PreviewReport {
            fps: config.stream.fps,
            frames_per_eye: args.frames,
            duration_secs: duration.as_secs_f64(),
            left_frames: summary.left_frames,
            right_frames: summary.right_frames,
            placeholder_frames: summary.placeholders,
            mean_interval_ms: summary.left_interval_ms.mean,
            max_interval_ms: summary.left_interval_ms.max,
            eye_alignment_pct: summary.alignment_rate,
            final_pts: summary.final_pts,
            time_base: config.stream.time_base().to_string(),
            captures: camera.capture_count(),
        };
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize preview report")?;
        println!("{}", json);
    } else {
        print_summary(&summary, duration.as_secs_f64(), camera.capture_count());
    }

    Ok(())
}

/// Pull `count` frames from one eye, feeding each into the shared aggregator
async fn pull_frames<S>(
    mut track: PacedEmitter<S>,
    count: u64,
    started: Instant,
    stats: Arc<Mutex<PacingStatsAggregator>>,
) -> Result<u64, CliError>
where
    S: FrameSource + Send + Sync,
{
    for _ in 0..count {
        let frame: VideoFrame = track
            .next_frame()
            .await
            .map_err(|e| CliError::session(format!("{} eye: {}", track.eye(), e)))?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(eye = %frame.eye, pts = frame.pts, placeholder = frame.placeholder, "frame");
        stats.lock().await.update(&frame, elapsed_ms);
    }
    Ok(track.emitted())
}

fn print_summary(summary: &PacingSummary, duration_secs: f64, captures: u64) {
    println!();
    print!("{}", summary);
    println!("Duration: {:.2}s", duration_secs);
    println!("Device captures: {}", captures);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_preview_refuses_disabled_camera() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[camera]\nkind = \"disabled\"").unwrap();

        let args = PreviewArgs {
            config: Some(file.path().to_path_buf()),
            frames: 3,
            fps: None,
            json: false,
        };
        let err = run_preview(&args).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::CameraUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_preview_short_session() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[camera]\nwidth = 32\nheight = 16\n\n[stream]\nfps = 120").unwrap();

        let args = PreviewArgs {
            config: Some(file.path().to_path_buf()),
            frames: 4,
            fps: None,
            json: true,
        };
        run_preview(&args).await.unwrap();
    }
}

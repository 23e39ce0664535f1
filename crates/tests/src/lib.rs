//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试（配置、标定的线上格式）
//! - 模拟 e2e 测试（无需相机硬件）
//! - 双目同步与节拍的跨 crate 不变量

#[cfg(test)]
mod contract_tests {
    use contracts::{Calibration, RelayConfig, TimeBase};

    #[test]
    fn test_calibration_wire_shape() {
        let calibration = Calibration {
            k_left: [[800.0, 0.0, 640.0], [0.0, 800.0, 360.0], [0.0, 0.0, 1.0]],
            k_right: [[800.0, 0.0, 640.0], [0.0, 800.0, 360.0], [0.0, 0.0, 1.0]],
            baseline_m: 0.075,
        };
        let value = serde_json::to_value(&calibration).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&"k_left"));
        assert!(keys.contains(&"k_right"));
        assert!(keys.contains(&"baseline_m"));
    }

    #[test]
    fn test_default_stream_timing() {
        let config = RelayConfig::default();
        assert_eq!(config.stream.pts_step(), 3000);
        assert_eq!(config.stream.time_base(), TimeBase::VIDEO_90K);
        assert_eq!(config.telemetry.port, 9090);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        Calibration, CameraConfig, Eye, FrameSource, PixelFormat, TimeBase, TransportTrack,
    };
    use frame_source::{open_camera, MockStereoSource};
    use sync_engine::{CalibrationAccessor, CalibrationStatus, EmitterConfig, StereoSession};
    use telemetry::{Delivery, TelemetryError, TelemetryRelay};
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::time::{timeout, Instant};

    fn calib() -> Calibration {
        Calibration {
            k_left: [[800.0, 0.0, 640.0], [0.0, 800.0, 360.0], [0.0, 0.0, 1.0]],
            k_right: [[800.0, 0.0, 640.0], [0.0, 800.0, 360.0], [0.0, 0.0, 1.0]],
            baseline_m: 0.075,
        }
    }

    fn small_config() -> EmitterConfig {
        EmitterConfig::from_stream(&Default::default(), 16, 8)
    }

    /// Leader then follower: different pixels, same timestamp
    #[tokio::test(start_paused = true)]
    async fn test_e2e_constant_pair() {
        let source = Arc::new(MockStereoSource::constant(16, 8, 50, 200));
        let session = StereoSession::new(1, source.clone(), small_config());
        let (mut left, mut right) = session.into_tracks();

        let l = left.next_frame().await.unwrap();
        let r = right.next_frame().await.unwrap();

        assert_eq!(l.eye, Eye::Left);
        assert_eq!(r.eye, Eye::Right);
        assert_eq!(l.image.format, PixelFormat::Bgr8);
        assert!(l.image.data.iter().all(|&p| p == 50));
        assert!(r.image.data.iter().all(|&p| p == 200));
        assert_eq!(l.pts, 3000);
        assert_eq!(r.pts, 3000);
        assert_eq!(l.time_base, TimeBase::VIDEO_90K);
        assert_eq!(r.time_base.to_string(), "1/90000");
        assert_eq!(source.capture_count(), 1);
    }

    /// Both eyes pulled concurrently; every frame's pixels match its pts
    #[tokio::test(start_paused = true)]
    async fn test_e2e_concurrent_eyes_never_torn() {
        let source = Arc::new(
            MockStereoSource::counting(16, 8).with_delay(Duration::from_millis(7)),
        );
        let session = StereoSession::new(2, source.clone(), small_config());
        let (mut left, mut right) = session.into_tracks();

        let left_task = tokio::spawn(async move {
            let mut frames = Vec::new();
            for _ in 0..40 {
                frames.push(left.next_frame().await.unwrap());
            }
            frames
        });
        let right_task = tokio::spawn(async move {
            let mut frames = Vec::new();
            for _ in 0..40 {
                frames.push(right.next_frame().await.unwrap());
            }
            frames
        });

        let left_frames = left_task.await.unwrap();
        let right_frames = right_task.await.unwrap();

        // Leader advances exactly one step per cycle
        for (i, frame) in left_frames.iter().enumerate() {
            assert_eq!(frame.pts, (i as u64 + 1) * 3000);
        }

        let mut last_right_pts = 0;
        for frame in left_frames.iter().chain(right_frames.iter()) {
            if frame.placeholder {
                assert_eq!(frame.pts, 0);
                continue;
            }
            let value = frame.image.data[0] as u64;
            assert!(frame.image.data.iter().all(|&p| p as u64 == value));
            assert_eq!(value * 3000, frame.pts, "pair and pts out of step");
        }
        for frame in &right_frames {
            assert!(frame.pts >= last_right_pts);
            assert!(frame.pts <= 40 * 3000);
            last_right_pts = frame.pts;
        }

        assert_eq!(source.capture_count(), 40);
        assert_eq!(source.invalidate_count(), 40);
    }

    /// Cadence holds across a session with slow captures
    #[tokio::test(start_paused = true)]
    async fn test_e2e_pacing_with_slow_capture() {
        let source = Arc::new(
            MockStereoSource::constant(16, 8, 1, 2).with_delay(Duration::from_millis(25)),
        );
        let config = small_config();
        let interval = config.frame_interval;
        let session = StereoSession::new(3, source, config);
        let (mut left, _right) = session.into_tracks();

        let start = Instant::now();
        left.next_frame().await.unwrap();
        let first = Instant::now();
        for _ in 1..30 {
            left.next_frame().await.unwrap();
        }
        let elapsed = first - start;
        let total = Instant::now() - start;

        assert!(elapsed >= interval);
        assert!(total >= interval * 30);
        // Capture time delays each frame but never accumulates
        assert!(total <= interval * 31);
    }

    /// Transport adapter surfaces capture failure as an error for that eye
    #[tokio::test(start_paused = true)]
    async fn test_e2e_transport_track_error() {
        let source = Arc::new(MockStereoSource::counting(16, 8));
        let session = StereoSession::new(4, source.clone(), small_config());
        let (mut left, mut right) = session.into_tracks();

        let frame = left.produce_next_frame().await.unwrap();
        assert_eq!(frame.pts, 3000);

        source.fail_next_capture();
        assert!(left.produce_next_frame().await.is_err());

        // Follower keeps serving the last good pair
        let r = right.produce_next_frame().await.unwrap();
        assert_eq!(r.pts, 3000);
        assert!(!r.placeholder);
    }

    #[tokio::test]
    async fn test_e2e_calibration_passthrough() {
        let source = Arc::new(MockStereoSource::counting(4, 4).with_calibration(calib()));
        let accessor = CalibrationAccessor::new(Some(source));
        match accessor.get_calibration().await {
            CalibrationStatus::Available(c) => {
                assert_eq!(c.k_left, [[800.0, 0.0, 640.0], [0.0, 800.0, 360.0], [0.0, 0.0, 1.0]]);
                assert_eq!(c.baseline_m, 0.075);
            }
            other => panic!("expected calibration, got {:?}", other),
        }

        let absent: CalibrationAccessor<MockStereoSource> = CalibrationAccessor::new(None);
        assert!(matches!(
            absent.get_calibration().await,
            CalibrationStatus::Unavailable { .. }
        ));
    }

    /// Config file → synthetic camera → session → calibration, no hardware
    #[tokio::test]
    async fn test_e2e_synthetic_camera_from_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[camera]
kind = "synthetic"
width = 64
height = 32

[camera.calibration]
k_left = [[800.0, 0.0, 640.0], [0.0, 800.0, 360.0], [0.0, 0.0, 1.0]]
k_right = [[800.0, 0.0, 640.0], [0.0, 800.0, 360.0], [0.0, 0.0, 1.0]]
baseline_m = 0.075

[stream]
fps = 120
"#
        )
        .unwrap();

        let config = config_loader::ConfigLoader::load_from_path(file.path()).unwrap();
        let camera = Arc::new(open_camera(&config.camera).unwrap().unwrap());

        let accessor = CalibrationAccessor::new(Some(camera.clone()));
        assert_eq!(
            accessor.get_calibration().await,
            CalibrationStatus::Available(calib())
        );

        let emitter_config =
            EmitterConfig::from_stream(&config.stream, config.camera.width, config.camera.height);
        assert_eq!(emitter_config.pts_step, 750);

        let session = StereoSession::new(5, camera.clone(), emitter_config);
        let (mut left, mut right) = session.into_tracks();

        let result = timeout(Duration::from_secs(5), async {
            let l = left.next_frame().await.unwrap();
            let r = right.next_frame().await.unwrap();
            (l, r)
        })
        .await
        .unwrap();

        let (l, r) = result;
        assert_eq!(l.image.dimensions(), (64, 32));
        assert_eq!(l.image.format, PixelFormat::Bgr8);
        assert_eq!(l.pts, 750);
        assert!(!r.placeholder);
        assert_eq!(r.pts, 750);
        assert_eq!(r.image.dimensions(), (64, 32));

        camera.stop();
        assert!(left.next_frame().await.is_err());
    }

    #[tokio::test]
    async fn test_e2e_disabled_camera() {
        let config = CameraConfig {
            kind: contracts::CameraKind::Disabled,
            ..Default::default()
        };
        assert!(open_camera(&config).unwrap().is_none());
    }

    /// Relay drops the sink on failure and keeps running
    #[tokio::test]
    async fn test_e2e_relay_failure_recovery() {
        let (client, server) = tokio::io::duplex(4096);
        let relay = TelemetryRelay::with_sink("actuator", client);

        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(server).lines();
            lines.next_line().await.unwrap()
        });

        assert_eq!(relay.send(r#"{"yaw":0.1}"#).await.unwrap(), Delivery::Sent);
        assert_eq!(
            reader.await.unwrap().as_deref(),
            Some(r#"{"yaw":0.1}"#)
        );

        // Reader (and its half of the pipe) is gone
        let err = relay.send(r#"{"yaw":0.2}"#).await.unwrap_err();
        assert!(matches!(err, TelemetryError::SinkWrite { .. }));
        assert!(!relay.is_connected().await);

        assert_eq!(relay.send(r#"{"yaw":0.3}"#).await.unwrap(), Delivery::Skipped);
        let metrics = relay.metrics();
        assert_eq!((metrics.sent, metrics.failed, metrics.skipped), (1, 1, 1));
    }

    /// Pacing statistics over a short session report full alignment at the end
    #[tokio::test(start_paused = true)]
    async fn test_e2e_pacing_stats() {
        let source = Arc::new(MockStereoSource::constant(16, 8, 10, 20));
        let session = StereoSession::new(6, source, small_config());
        let (mut left, mut right) = session.into_tracks();
        let mut stats = observability::PacingStatsAggregator::new();
        let start = Instant::now();

        for _ in 0..10 {
            let l = left.next_frame().await.unwrap();
            stats.update(&l, start.elapsed().as_secs_f64() * 1000.0);
            let r = right.next_frame().await.unwrap();
            stats.update(&r, start.elapsed().as_secs_f64() * 1000.0);
        }

        let summary = stats.summary();
        assert_eq!(summary.left_frames, 10);
        assert_eq!(summary.right_frames, 10);
        assert_eq!(summary.placeholders, 0);
        assert_eq!(summary.final_pts, 30000);
        assert!((summary.alignment_rate - 100.0).abs() < 1e-10);
    }
}

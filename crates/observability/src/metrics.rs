//! Stereo relay 指标收集模块
//!
//! 引擎与转发器内部直接打点；这里提供会话级别的记录函数，
//! 以及预览模式下的节拍统计聚合器。

use contracts::{Eye, VideoFrame};
use metrics::{counter, gauge, histogram};

/// 记录观看会话开始
pub fn record_session_started(session_id: u64) {
    counter!("stereo_sessions_total").increment(1);
    gauge!("stereo_sessions_active").increment(1.0);
    gauge!("stereo_last_session_id").set(session_id as f64);
}

/// 记录观看会话结束
pub fn record_session_ended(frames_emitted: u64) {
    gauge!("stereo_sessions_active").decrement(1.0);
    histogram!("stereo_session_frames").record(frames_emitted as f64);
}

/// 记录收到的姿态消息
pub fn record_pose_received(bytes: usize) {
    counter!("telemetry_pose_received_total").increment(1);
    histogram!("telemetry_pose_bytes").record(bytes as f64);
}

/// 记录标定请求结果
pub fn record_calibration_request(available: bool) {
    let status = if available { "available" } else { "unavailable" };
    counter!("stereo_calibration_requests_total", "status" => status).increment(1);
}

/// 单眼节拍统计
#[derive(Debug, Clone, Default)]
pub struct EyeStats {
    /// 输出帧数
    pub frames: u64,
    /// 占位帧数
    pub placeholders: u64,
    /// 相邻帧间隔 (毫秒)
    pub interval_ms: RunningStats,
    last_emit_ms: Option<f64>,
    last_pts: Option<u64>,
}

impl EyeStats {
    fn update(&mut self, frame: &VideoFrame, elapsed_ms: f64) {
        self.frames += 1;
        if frame.placeholder {
            self.placeholders += 1;
        }
        if let Some(prev) = self.last_emit_ms {
            self.interval_ms.push(elapsed_ms - prev);
        }
        self.last_emit_ms = Some(elapsed_ms);
        self.last_pts = Some(frame.pts);
    }
}

/// 节拍统计聚合器
///
/// 预览模式下按帧喂入左右眼输出，统计帧间隔与双眼 pts 对齐情况。
#[derive(Debug, Clone, Default)]
pub struct PacingStatsAggregator {
    pub left: EyeStats,
    pub right: EyeStats,
    /// 右眼 pts 与最近左眼 pts 一致的帧数
    pub aligned_pairs: u64,
    /// 右眼 pts 落后于左眼的帧数
    pub stale_pairs: u64,
}

impl PacingStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一帧输出，`elapsed_ms` 为自会话开始的毫秒数
    pub fn update(&mut self, frame: &VideoFrame, elapsed_ms: f64) {
        match frame.eye {
            Eye::Left => self.left.update(frame, elapsed_ms),
            Eye::Right => {
                self.right.update(frame, elapsed_ms);
                if let Some(left_pts) = self.left.last_pts {
                    if frame.pts == left_pts {
                        self.aligned_pairs += 1;
                    } else {
                        self.stale_pairs += 1;
                    }
                }
            }
        }
    }

    /// 生成摘要
    pub fn summary(&self) -> PacingSummary {
        let compared = self.aligned_pairs + self.stale_pairs;
        PacingSummary {
            left_frames: self.left.frames,
            right_frames: self.right.frames,
            placeholders: self.left.placeholders + self.right.placeholders,
            left_interval_ms: StatsSummary::from(&self.left.interval_ms),
            right_interval_ms: StatsSummary::from(&self.right.interval_ms),
            alignment_rate: if compared > 0 {
                self.aligned_pairs as f64 / compared as f64 * 100.0
            } else {
                0.0
            },
            final_pts: self.left.last_pts.unwrap_or(0),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 节拍摘要
#[derive(Debug, Clone, Default)]
pub struct PacingSummary {
    pub left_frames: u64,
    pub right_frames: u64,
    pub placeholders: u64,
    pub left_interval_ms: StatsSummary,
    pub right_interval_ms: StatsSummary,
    pub alignment_rate: f64,
    pub final_pts: u64,
}

impl std::fmt::Display for PacingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Pacing Summary ===")?;
        writeln!(
            f,
            "Frames: left={}, right={}",
            self.left_frames, self.right_frames
        )?;
        writeln!(f, "Placeholder frames: {}", self.placeholders)?;
        writeln!(f, "Left interval (ms): {}", self.left_interval_ms)?;
        writeln!(f, "Right interval (ms): {}", self.right_interval_ms)?;
        writeln!(f, "Eye pts alignment: {:.2}%", self.alignment_rate)?;
        writeln!(f, "Final pts: {}", self.final_pts)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

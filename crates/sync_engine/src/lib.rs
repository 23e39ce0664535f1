//! # Sync Engine
//!
//! 双目帧同步与节拍引擎。
//!
//! 负责：
//! - 每个观看会话一个 `PairCache`（左右图像 + 共享时间戳，单锁保护）
//! - 每只眼一个 `PacedEmitter`：固定 30fps 墙钟节拍，不累积漂移
//! - 仅 leader 眼触发采集并推进时间戳，follower 只读
//! - 标定信息只读访问
//!
//! ## 使用示例
//!
//! ```ignore
//! use sync_engine::{EmitterConfig, StereoSession};
//!
//! let session = StereoSession::new(1, source.clone(), EmitterConfig::default());
//! let (mut left, mut right) = session.into_tracks();
//!
//! tokio::spawn(async move { while let Ok(frame) = left.next_frame().await { /* send */ } });
//! tokio::spawn(async move { while let Ok(frame) = right.next_frame().await { /* send */ } });
//! ```

mod cache;
mod calibration;
mod color;
mod emitter;
mod error;
mod session;

pub use cache::{PairCache, PairCacheGuard};
pub use calibration::{CalibrationAccessor, CalibrationStatus};
pub use color::{placeholder, to_bgr};
pub use emitter::{EmitterConfig, PacedEmitter};
pub use error::EmitterError;
pub use session::StereoSession;

// Re-export contracts types
pub use contracts::{Eye, EyeRole, StereoPair, TimeBase, VideoFrame};

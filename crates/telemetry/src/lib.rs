//! # Telemetry
//!
//! 姿态遥测转发模块。
//!
//! 负责：
//! - 将观看端的姿态消息（JSON 文本）逐行转发给执行器控制器 (TCP)
//! - 单锁串行化发送，保证消息顺序
//! - 写失败即丢弃连接，不重试、不缓存（尽力而为）

pub mod error;
pub mod metrics;
pub mod relay;

pub use error::TelemetryError;
pub use metrics::{RelayMetrics, RelayMetricsSnapshot};
pub use relay::{Delivery, TelemetryRelay};

//! GridVoice 日志系统模块
//!
//! 基于 tracing 的结构化日志，支持：
//! - 控制台与按天滚动的文件输出
//! - JSON 格式可选
//! - 非阻塞异步写入
//! - 全局配置与环境变量覆盖

pub mod config;
pub mod logger;

pub use config::{LogLevel, LoggingConfig};
pub use logger::LogManager;

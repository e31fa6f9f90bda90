use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 日志级别枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// 日志配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,
    /// 是否启用控制台输出
    pub console_enabled: bool,
    /// 是否启用文件输出
    pub file_enabled: bool,
    /// 自定义日志文件路径
    pub file_path: Option<PathBuf>,
    /// 是否使用JSON格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console_enabled: true,
            file_enabled: true,
            file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 解析字符串为日志级别
    pub fn parse_level(level_str: &str) -> Result<LogLevel, String> {
        match level_str.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("无效的日志级别: {}", level_str)),
        }
    }

    /// 获取默认日志文件目录
    pub fn default_log_file_path() -> PathBuf {
        if let Some(data_dir) = dirs::data_dir() {
            data_dir.join("GridVoice").join("logs")
        } else {
            std::env::temp_dir().join("GridVoice").join("logs")
        }
    }

    /// 获取有效的日志文件目录
    pub fn get_effective_log_path(&self) -> PathBuf {
        self.file_path
            .clone()
            .unwrap_or_else(Self::default_log_file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(LoggingConfig::parse_level("debug").unwrap(), LogLevel::Debug);
        assert_eq!(LoggingConfig::parse_level("WARN").unwrap(), LogLevel::Warn);
        assert!(LoggingConfig::parse_level("verbose").is_err());
    }

    #[test]
    fn test_level_display_matches_env_filter_syntax() {
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Trace.to_string(), "trace");
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.console_enabled);
        assert!(config.file_enabled);
        assert!(!config.json_format);
    }
}

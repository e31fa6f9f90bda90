use crate::logging::config::LoggingConfig;
use crate::utils::config::read_global_config;
use anyhow::{anyhow, Context, Result};
use std::fs;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// 日志管理器
///
/// 持有文件输出的 worker guard，丢弃时刷新并关闭日志文件。
pub struct LogManager {
    pub config: LoggingConfig,
    _guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

impl LogManager {
    /// 初始化日志系统
    ///
    /// 配置来源优先级：环境变量 > 全局配置文件 > 默认值。
    pub fn init() -> Result<Self> {
        let mut config = read_global_config()
            .ok()
            .flatten()
            .map(|config| config.log_config)
            .unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Self::init_with_config(config)
    }

    /// 使用指定配置初始化日志系统
    pub fn init_with_config(config: LoggingConfig) -> Result<Self> {
        // 确保日志目录存在
        if config.file_enabled {
            let log_path = config.get_effective_log_path();
            fs::create_dir_all(&log_path)
                .with_context(|| format!("无法创建日志目录: {:?}", log_path))?;
        }

        let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

        // 控制台日志层
        if config.console_enabled {
            layers.push(Self::create_console_layer(&config));
        }

        // 文件日志层（按天滚动，非阻塞写入）
        let mut file_guard = None;
        if config.file_enabled {
            let (layer, guard) = Self::create_file_layer(&config);
            file_guard = Some(guard);
            layers.push(layer);
        }

        let filter = EnvFilter::new(format!("gridvoice={}", config.level));
        Registry::default()
            .with(layers)
            .with(filter)
            .try_init()
            .map_err(|e| anyhow!("日志系统初始化失败: {}", e))?;

        tracing::info!(
            "日志系统初始化完成 - 级别: {}, 控制台: {}, 文件: {}",
            config.level,
            config.console_enabled,
            config.file_enabled
        );

        Ok(Self {
            config,
            _guard: file_guard,
        })
    }

    /// 应用环境变量覆盖
    fn apply_env_overrides(config: &mut LoggingConfig) {
        if let Ok(level_str) = std::env::var("RUST_LOG") {
            if let Ok(level) = LoggingConfig::parse_level(&level_str) {
                config.level = level;
            }
        }

        if let Ok(enabled) = std::env::var("GRIDVOICE_LOG_CONSOLE") {
            config.console_enabled = enabled.parse().unwrap_or(true);
        }

        if let Ok(enabled) = std::env::var("GRIDVOICE_LOG_FILE") {
            config.file_enabled = enabled.parse().unwrap_or(true);
        }

        if let Ok(path) = std::env::var("GRIDVOICE_LOG_PATH") {
            config.file_path = Some(path.into());
        }

        if let Ok(json_fmt) = std::env::var("GRIDVOICE_LOG_JSON") {
            config.json_format = json_fmt.parse().unwrap_or(false);
        }
    }

    /// 创建控制台日志层
    fn create_console_layer(_config: &LoggingConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    }

    /// 创建文件日志层（带 guard）
    fn create_file_layer(
        config: &LoggingConfig,
    ) -> (
        Box<dyn Layer<Registry> + Send + Sync>,
        tracing_appender::non_blocking::WorkerGuard,
    ) {
        use tracing_appender::{non_blocking, rolling};

        let file_appender = rolling::daily(config.get_effective_log_path(), "gridvoice.log");
        let (writer, guard) = non_blocking(file_appender);

        let layer = if config.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(writer)
                .boxed()
        } else {
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .boxed()
        };

        (layer, guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::config::LogLevel;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "RUST_LOG",
            "GRIDVOICE_LOG_CONSOLE",
            "GRIDVOICE_LOG_FILE",
            "GRIDVOICE_LOG_PATH",
            "GRIDVOICE_LOG_JSON",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("RUST_LOG", "debug");
        std::env::set_var("GRIDVOICE_LOG_CONSOLE", "false");
        std::env::set_var("GRIDVOICE_LOG_PATH", "/tmp/gridvoice-test-logs");

        let mut config = LoggingConfig::default();
        LogManager::apply_env_overrides(&mut config);

        assert_eq!(config.level, LogLevel::Debug);
        assert!(!config.console_enabled);
        assert_eq!(
            config.file_path.as_deref(),
            Some(std::path::Path::new("/tmp/gridvoice-test-logs"))
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_keep_defaults() {
        clear_env();
        std::env::set_var("RUST_LOG", "loudest");

        let mut config = LoggingConfig::default();
        LogManager::apply_env_overrides(&mut config);

        assert_eq!(config.level, LogLevel::Info);
        clear_env();
    }
}

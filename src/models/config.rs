// 全局配置结构，放在 models 以便各服务共享
use crate::logging::LoggingConfig;
use crate::utils::constants::LOCAL_NOLOGIN_USERNAME;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// 配置文件写入时的应用版本（缺失时读取阶段自动补齐）
    #[serde(default)]
    pub version: Option<String>,
    /// 当前用户名；未登录时为本地默认用户
    #[serde(default = "default_username")]
    pub username: String,
    /// 界面语言 locale（如 "de"、"en_US"）；缺省时从环境检测
    #[serde(default)]
    pub locale: Option<String>,
    /// 日志配置
    #[serde(default)]
    pub log_config: LoggingConfig,
}

fn default_username() -> String {
    LOCAL_NOLOGIN_USERNAME.to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            version: None,
            username: default_username(),
            locale: None,
            log_config: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_username_is_local_user() {
        let config = GlobalConfig::default();
        assert_eq!(config.username, LOCAL_NOLOGIN_USERNAME);
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let config: GlobalConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.username, LOCAL_NOLOGIN_USERNAME);
        assert!(config.version.is_none());
        assert!(config.locale.is_none());
    }
}

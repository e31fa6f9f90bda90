// 全局配置读写
use crate::models::GlobalConfig;
use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 当前应用版本（从 Cargo.toml 读取）
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// GridVoice 配置目录 (~/.gridvoice)，若不存在则创建
pub fn config_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Failed to get home directory"))?;
    let config_dir = home_dir.join(".gridvoice");
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .map_err(|e| anyhow!("Failed to create config directory: {}", e))?;
    }
    Ok(config_dir)
}

/// 全局配置文件路径
pub fn global_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// 读取全局配置（若文件不存在返回 Ok(None)）
pub fn read_global_config() -> Result<Option<GlobalConfig>> {
    read_config_from(&global_config_path()?)
}

/// 写入全局配置，同时设置文件权限
pub fn write_global_config(config: &GlobalConfig) -> Result<()> {
    write_config_to(&global_config_path()?, config)
}

/// 从指定路径读取配置
///
/// 读取时自动补齐缺失的版本号并落盘，避免旧配置文件一直无版本。
pub fn read_config_from(config_path: &Path) -> Result<Option<GlobalConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content =
        fs::read_to_string(config_path).map_err(|e| anyhow!("Failed to read config: {}", e))?;
    let mut config: GlobalConfig =
        serde_json::from_str(&content).map_err(|e| anyhow!("Failed to parse config: {}", e))?;

    heal_config_version(config_path, &mut config)?;

    Ok(Some(config))
}

/// 补齐缺失的配置版本号
fn heal_config_version(config_path: &Path, config: &mut GlobalConfig) -> Result<()> {
    if config.version.is_none() {
        tracing::info!("配置缺少版本号，补齐为 {}", APP_VERSION);
        config.version = Some(APP_VERSION.to_string());
        write_config_to(config_path, config)?;
    }
    Ok(())
}

/// 写入配置到指定路径
pub fn write_config_to(config_path: &Path, config: &GlobalConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

    fs::write(config_path, json).map_err(|e| anyhow!("Failed to write config: {}", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = fs::metadata(config_path)
            .map_err(|e| anyhow!("Failed to get file metadata: {}", e))?;
        let mut perms = metadata.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(config_path, perms)
            .map_err(|e| anyhow!("Failed to set file permissions: {}", e))?;
    }

    Ok(())
}

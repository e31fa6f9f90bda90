// lib.rs - 暴露核心数据服务给应用外壳使用

pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

pub use models::record::{Objects, Record};
pub use models::version::{latest_model_version, model_version_string, ModelVersion};
pub use models::GlobalConfig;

// 显式重新导出服务类型，避免 glob 导出歧义
pub use services::action::{ActionService, ElementSource, SpeechSynthesizer};
pub use services::encryption::{CryptoContext, EncryptionError, KdfParams};
pub use services::filter::{
    create_filter_service, FilterError, FilterOptions, FilterService, ModelUpgrade,
};
pub use services::translate::TranslateService;

pub use logging::{LogLevel, LogManager, LoggingConfig};

// 重新导出常用类型
pub use anyhow::{Context, Result};
